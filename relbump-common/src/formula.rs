// relbump-common/src/formula.rs
//! Structured parsing and span-based patching of the release descriptor
//! (the Homebrew formula).
//!
//! The parser walks the Ruby block structure line by line and types each
//! `url`/`sha256` pair by the platform branch it sits in. Patching rewrites
//! only the recorded byte spans, so everything outside the targeted fields
//! survives byte-for-byte.

use tracing::debug;

use crate::error::{RelbumpError, Result};
use crate::model::artifact::{ArtifactReference, Checksum, PlatformPredicate};
use crate::model::version::Version;

/// Sentinel the release flow leaves in a sha256 field until the tagged
/// binaries exist.
pub const PENDING_CHECKSUM_SENTINEL: &str = "REPLACE_AFTER_PUSHING_TAG";

const INTEL_PREDICATE: &str = "if Hardware::CPU.intel?";

/// Byte range of a quoted field's contents within the descriptor text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FieldSpan {
    start: usize,
    end: usize,
}

#[derive(Debug, Clone)]
struct ArtifactBlock {
    platform: PlatformPredicate,
    url: String,
    url_span: FieldSpan,
    sha256: String,
    sha256_span: FieldSpan,
}

/// A parsed release descriptor: the original text plus the typed artifact
/// reference blocks found in it.
#[derive(Debug, Clone)]
pub struct Descriptor {
    text: String,
    blocks: Vec<ArtifactBlock>,
}

/// Replacement values for one artifact reference, keyed by its platform
/// anchor.
#[derive(Debug, Clone)]
pub struct ReferenceUpdate {
    pub platform: PlatformPredicate,
    pub url: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockCtx {
    IntelBranch,
    ArmBranch,
    Other,
}

fn platform_for(stack: &[BlockCtx]) -> PlatformPredicate {
    for ctx in stack.iter().rev() {
        match ctx {
            BlockCtx::IntelBranch => return PlatformPredicate::MacosIntel,
            BlockCtx::ArmBranch => return PlatformPredicate::MacosArm,
            BlockCtx::Other => {}
        }
    }
    PlatformPredicate::Source
}

fn opens_block(trimmed: &str) -> bool {
    trimmed.ends_with(" do")
        || trimmed == "do"
        || trimmed.starts_with("class ")
        || trimmed.starts_with("def ")
        || trimmed.starts_with("if ")
        || trimmed.starts_with("unless ")
}

fn parse_err(line_no: usize, field: &str, msg: &str) -> RelbumpError {
    RelbumpError::ParseError("formula", format!("line {line_no}: {field}: {msg}"))
}

/// Extracts the contents of the first quoted string on `line`, returning
/// the value and its byte span within the whole descriptor.
fn quoted_span(
    line: &str,
    line_offset: usize,
    line_no: usize,
    field: &'static str,
) -> Result<(String, FieldSpan)> {
    let open = line
        .find('"')
        .ok_or_else(|| parse_err(line_no, field, "missing opening quote"))?;
    let rest = &line[open + 1..];
    let close = rest
        .find('"')
        .ok_or_else(|| parse_err(line_no, field, "missing closing quote"))?;
    let start = line_offset + open + 1;
    Ok((
        rest[..close].to_string(),
        FieldSpan {
            start,
            end: start + close,
        },
    ))
}

impl Descriptor {
    pub fn parse(text: &str) -> Result<Self> {
        let mut stack: Vec<BlockCtx> = Vec::new();
        let mut blocks: Vec<ArtifactBlock> = Vec::new();
        // (url, span, platform, line) waiting for its sha256 partner
        let mut pending_url: Option<(String, FieldSpan, PlatformPredicate, usize)> = None;
        let mut offset = 0usize;

        for (idx, line) in text.split_inclusive('\n').enumerate() {
            let line_no = idx + 1;
            let trimmed = line.trim();

            if trimmed.starts_with("url \"") {
                if let Some((_, _, platform, prev_line)) = &pending_url {
                    return Err(parse_err(
                        *prev_line,
                        "url",
                        &format!(
                            "no matching sha256 before the next url (in {})",
                            platform.describe()
                        ),
                    ));
                }
                let (value, span) = quoted_span(line, offset, line_no, "url")?;
                pending_url = Some((value, span, platform_for(&stack), line_no));
            } else if trimmed.starts_with("sha256 \"") {
                let (value, span) = quoted_span(line, offset, line_no, "sha256")?;
                let Some((url, url_span, platform, _)) = pending_url.take() else {
                    return Err(parse_err(line_no, "sha256", "no preceding url to pair with"));
                };
                if blocks.iter().any(|b| b.platform == platform) {
                    return Err(parse_err(
                        line_no,
                        "sha256",
                        &format!("duplicate artifact reference for {}", platform.describe()),
                    ));
                }
                blocks.push(ArtifactBlock {
                    platform,
                    url,
                    url_span,
                    sha256: value,
                    sha256_span: span,
                });
            } else if trimmed == INTEL_PREDICATE {
                stack.push(BlockCtx::IntelBranch);
            } else if trimmed == "else" {
                if let Some(top) = stack.last_mut() {
                    if *top == BlockCtx::IntelBranch {
                        *top = BlockCtx::ArmBranch;
                    }
                }
            } else if trimmed == "end" {
                stack.pop();
            } else if opens_block(trimmed) {
                stack.push(BlockCtx::Other);
            }

            offset += line.len();
        }

        if let Some((_, _, platform, line_no)) = pending_url {
            return Err(parse_err(
                line_no,
                "url",
                &format!("no matching sha256 (in {})", platform.describe()),
            ));
        }

        debug!("Parsed {} artifact reference blocks", blocks.len());
        Ok(Self {
            text: text.to_string(),
            blocks,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn references(&self) -> Vec<ArtifactReference> {
        self.blocks
            .iter()
            .map(|b| ArtifactReference {
                platform: b.platform,
                url: b.url.clone(),
                checksum: Checksum::classify(&b.sha256),
            })
            .collect()
    }

    pub fn reference(&self, platform: PlatformPredicate) -> Option<ArtifactReference> {
        self.blocks
            .iter()
            .find(|b| b.platform == platform)
            .map(|b| ArtifactReference {
                platform: b.platform,
                url: b.url.clone(),
                checksum: Checksum::classify(&b.sha256),
            })
    }

    /// Produces a new descriptor text with the given references' url and
    /// sha256 fields replaced. Every byte outside the replaced spans is
    /// carried over unchanged.
    pub fn with_updates(&self, updates: &[ReferenceUpdate]) -> Result<String> {
        let mut edits: Vec<(FieldSpan, &str)> = Vec::with_capacity(updates.len() * 2);
        for update in updates {
            let block = self
                .blocks
                .iter()
                .find(|b| b.platform == update.platform)
                .ok_or_else(|| {
                    RelbumpError::PatternNotFound(update.platform.anchor().to_string())
                })?;
            edits.push((block.url_span, update.url.as_str()));
            edits.push((block.sha256_span, update.sha256.as_str()));
        }
        edits.sort_by_key(|(span, _)| span.start);

        // Spans come from distinct quoted fields and cannot overlap.
        let mut out = String::with_capacity(self.text.len());
        let mut cursor = 0usize;
        for (span, replacement) in edits {
            out.push_str(&self.text[cursor..span.start]);
            out.push_str(replacement);
            cursor = span.end;
        }
        out.push_str(&self.text[cursor..]);
        Ok(out)
    }
}

/// Replaces the version token embedded in a release URL with the target
/// version, keeping the `v` tag prefix in place.
///
/// Every artifact URL carries exactly one such token; zero or several is
/// structural drift and surfaces as `PatternNotFound` naming the URL.
pub fn substitute_version(url: &str, target: &Version) -> Result<String> {
    let bytes = url.as_bytes();
    let mut tokens: Vec<(usize, usize)> = Vec::new();
    let mut i = 0usize;
    while i < bytes.len() {
        if bytes[i] == b'v'
            && i > 0
            && bytes[i - 1] == b'/'
            && i + 1 < bytes.len()
            && bytes[i + 1].is_ascii_digit()
        {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'.') {
                end += 1;
            }
            // a token like `0.8.6.tar.gz` stops before the extension
            while end > start && bytes[end - 1] == b'.' {
                end -= 1;
            }
            tokens.push((start, end - start));
            i = end;
        } else {
            i += 1;
        }
    }

    match tokens.as_slice() {
        [(start, len)] => {
            let (start, len) = (*start, *len);
            let mut out = String::with_capacity(url.len());
            out.push_str(&url[..start]);
            out.push_str(target.as_str());
            out.push_str(&url[start + len..]);
            Ok(out)
        }
        [] => Err(RelbumpError::PatternNotFound(format!(
            "version token in URL '{url}'"
        ))),
        _ => Err(RelbumpError::PatternNotFound(format!(
            "multiple version tokens in URL '{url}'"
        ))),
    }
}

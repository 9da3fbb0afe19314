//! Hunk identity: the `@@ -old,len +new,len @@` coordinate quadruple.

use error_set::error_set;
use nom::Parser;
use nom::bytes::complete::tag;
use nom::character::complete::u32 as line_number;
use nom::combinator::opt;
use nom::sequence::preceded;
use std::fmt;

error_set! {
    /// Errors from interpreting hunk diff text
    HunkError := {
        /// Hunk text does not start with a parseable `@@` header line
        #[display("Malformed hunk header '{header}'")]
        MalformedHeader { header: String },
        /// Hunk text is empty
        #[display("Hunk text is empty")]
        EmptyHunk,
    }
}

/// Coordinates of a contiguous diff region, as they appear in a unified diff
/// header. This is the identity key for hunks and the unit a backend accepts
/// when materializing a partial commit.
///
/// All coordinates are 1-based. A zero `old_lines` means "insert after
/// `old_start`", a zero `new_lines` means "the gap sits after `new_start`",
/// following the unified diff convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HunkHeader {
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
}

impl HunkHeader {
    pub fn new(old_start: u32, old_lines: u32, new_start: u32, new_lines: u32) -> Self {
        Self {
            old_start,
            old_lines,
            new_start,
            new_lines,
        }
    }

    /// Parse a header line like `@@ -136,0 +137 @@` (trailing section text
    /// after the closing `@@` is ignored). Omitted counts default to 1 as in
    /// git output.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let (_, header) = parse_header(line).ok()?;
        Some(header)
    }

    /// Whether `other` addresses a sub-region of this hunk on both sides.
    #[must_use]
    pub fn contains(&self, other: HunkHeader) -> bool {
        let old_ok = other.old_start >= self.old_start
            && other.old_start + other.old_lines <= self.old_start + self.old_lines;
        let new_ok = other.new_start >= self.new_start
            && other.new_start + other.new_lines <= self.new_start + self.new_lines;
        old_ok && new_ok
    }
}

fn parse_header(input: &str) -> nom::IResult<&str, HunkHeader> {
    let (rest, (_, old_start, old_lines, _, new_start, new_lines, _)) = (
        tag("@@ -"),
        line_number,
        opt(preceded(tag(","), line_number)),
        tag(" +"),
        line_number,
        opt(preceded(tag(","), line_number)),
        tag(" @@"),
    )
        .parse(input)?;

    Ok((
        rest,
        HunkHeader {
            old_start,
            old_lines: old_lines.unwrap_or(1),
            new_start,
            new_lines: new_lines.unwrap_or(1),
        },
    ))
}

impl fmt::Display for HunkHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Git elides a count of 1
        let old_part = match self.old_lines {
            1 => format!("-{}", self.old_start),
            n => format!("-{},{}", self.old_start, n),
        };
        let new_part = match self.new_lines {
            1 => format!("+{}", self.new_start),
            n => format!("+{},{}", self.new_start, n),
        };
        write!(f, "@@ {} {} @@", old_part, new_part)
    }
}

/// One hunk of a file's current diff: its identifying coordinates plus the
/// raw unified-diff text (header line included).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffHunk {
    pub header: HunkHeader,
    pub diff: String,
}

impl DiffHunk {
    /// Build a hunk from its raw diff text, taking the identity coordinates
    /// from the leading header line.
    pub fn from_text(diff: impl Into<String>) -> Result<Self, HunkError> {
        let diff = diff.into();
        let first = diff.lines().next().ok_or(HunkError::EmptyHunk)?;
        let header = HunkHeader::parse(first).ok_or_else(|| HunkError::MalformedHeader {
            header: first.to_string(),
        })?;
        Ok(Self { header, diff })
    }
}

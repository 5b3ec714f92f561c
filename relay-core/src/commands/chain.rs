//! Chain Parser (C4): splits composite input on `&&`, `||`, `;` honoring
//! quotes.

/// The operator linking a [`ChainSegment`] to the *next* segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainOperator {
    /// `&&` — run the next segment only if this one succeeded.
    And,
    /// `||` — run the next segment only if this one failed.
    Or,
    /// `;` — always run the next segment.
    Then,
}

/// One command substring plus the operator linking it to the next segment.
/// The last segment in a chain has `operator = None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainSegment {
    pub command: String,
    pub operator: Option<ChainOperator>,
}

/// The result of splitting an input string on chain operators.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainedInput {
    pub segments: Vec<ChainSegment>,
    pub is_chained: bool,
}

/// Scans `input` byte-by-byte tracking quote state (double-quote honors `\`
/// escapes, single-quote does not) and splits on `&&`, `||`, `;` outside
/// quotes. Empty segments between operators are dropped.
pub fn parse_chain(input: &str) -> ChainedInput {
    let bytes = input.as_bytes();
    let len = bytes.len();

    let mut raw: Vec<(String, Option<ChainOperator>)> = Vec::new();
    let mut seg_start = 0usize;
    let mut in_double = false;
    let mut in_single = false;
    let mut i = 0usize;

    while i < len {
        let b = bytes[i];
        if in_double {
            if b == b'\\' {
                i += 2;
                continue;
            } else if b == b'"' {
                in_double = false;
            }
            i += 1;
            continue;
        }
        if in_single {
            if b == b'\'' {
                in_single = false;
            }
            i += 1;
            continue;
        }

        match b {
            b'"' => {
                in_double = true;
                i += 1;
            }
            b'\'' => {
                in_single = true;
                i += 1;
            }
            b'&' if i + 1 < len && bytes[i + 1] == b'&' => {
                raw.push((input[seg_start..i].trim().to_string(), Some(ChainOperator::And)));
                i += 2;
                seg_start = i;
            }
            b'|' if i + 1 < len && bytes[i + 1] == b'|' => {
                raw.push((input[seg_start..i].trim().to_string(), Some(ChainOperator::Or)));
                i += 2;
                seg_start = i;
            }
            b';' => {
                raw.push((input[seg_start..i].trim().to_string(), Some(ChainOperator::Then)));
                i += 1;
                seg_start = i;
            }
            _ => {
                i += 1;
            }
        }
    }
    raw.push((input[seg_start..len].trim().to_string(), None));

    let mut segments: Vec<ChainSegment> = raw
        .into_iter()
        .filter(|(text, _)| !text.is_empty())
        .map(|(command, operator)| ChainSegment { command, operator })
        .collect();

    // A dropped trailing empty segment can leave the new last segment
    // carrying a dangling operator (e.g. "/a &&" with nothing after); the
    // last segment never has an outgoing operator.
    if let Some(last) = segments.last_mut() {
        last.operator = None;
    }

    let is_chained = segments.len() > 1;
    ChainedInput { segments, is_chained }
}

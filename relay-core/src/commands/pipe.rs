//! Pipe Parser (C5): splits composite input on `|`, `>`, `>>` honoring
//! quotes; identifies the redirect target.

/// Whether a [`PipeSegment`] is a command to execute or a redirect file
/// target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeSegmentKind {
    Command,
    File,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipeSegment {
    pub text: String,
    pub kind: PipeSegmentKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectMode {
    Overwrite,
    Append,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipedInput {
    pub segments: Vec<PipeSegment>,
    pub has_redirect: bool,
    pub redirect_mode: Option<RedirectMode>,
    pub redirect_target: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    Pipe,
    Overwrite,
    Append,
}

/// Quote-aware scan recognizing `|` (but not `||` — both neighboring bytes
/// must not be `|`), `>`, and `>>`.
pub fn parse_pipe(input: &str) -> PipedInput {
    let bytes = input.as_bytes();
    let len = bytes.len();

    let mut raw: Vec<(String, Option<Delimiter>)> = Vec::new();
    let mut seg_start = 0usize;
    let mut in_double = false;
    let mut in_single = false;
    let mut i = 0usize;
    let mut pending_delim: Option<Delimiter> = None;

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
            b'|' => {
                let prev_is_pipe = i > 0 && bytes[i - 1] == b'|';
                let next_is_pipe = i + 1 < len && bytes[i + 1] == b'|';
                if prev_is_pipe || next_is_pipe {
                    i += 1;
                } else {
                    raw.push((input[seg_start..i].to_string(), pending_delim));
                    pending_delim = Some(Delimiter::Pipe);
                    i += 1;
                    seg_start = i;
                }
            }
            b'>' if i + 1 < len && bytes[i + 1] == b'>' => {
                raw.push((input[seg_start..i].to_string(), pending_delim));
                pending_delim = Some(Delimiter::Append);
                i += 2;
                seg_start = i;
            }
            b'>' => {
                raw.push((input[seg_start..i].to_string(), pending_delim));
                pending_delim = Some(Delimiter::Overwrite);
                i += 1;
                seg_start = i;
            }
            _ => {
                i += 1;
            }
        }
    }
    raw.push((input[seg_start..len].to_string(), pending_delim));

    let mut segments = Vec::new();
    let mut has_redirect = false;
    let mut redirect_mode = None;
    let mut redirect_target = None;

    for (text, delim) in raw {
        let text = text.trim().to_string();
        if text.is_empty() {
            continue;
        }
        let kind = match delim {
            None | Some(Delimiter::Pipe) => PipeSegmentKind::Command,
            Some(Delimiter::Overwrite) => {
                has_redirect = true;
                redirect_mode = Some(RedirectMode::Overwrite);
                redirect_target = Some(text.clone());
                PipeSegmentKind::File
            }
            Some(Delimiter::Append) => {
                has_redirect = true;
                redirect_mode = Some(RedirectMode::Append);
                redirect_target = Some(text.clone());
                PipeSegmentKind::File
            }
        };
        segments.push(PipeSegment { text, kind });
    }

    PipedInput {
        segments,
        has_redirect,
        redirect_mode,
        redirect_target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_segment_no_redirect() {
        let result = parse_pipe("/list foo");
        assert_eq!(result.segments.len(), 1);
        assert_eq!(result.segments[0].kind, PipeSegmentKind::Command);
        assert!(!result.has_redirect);
    }

    #[test]
    fn pipe_with_redirect() {
        let result = parse_pipe("/list | /filter foo > out.txt");
        assert_eq!(result.segments.len(), 3);
        assert_eq!(result.segments[0].text, "/list");
        assert_eq!(result.segments[0].kind, PipeSegmentKind::Command);
        assert_eq!(result.segments[1].text, "/filter foo");
        assert_eq!(result.segments[1].kind, PipeSegmentKind::Command);
        assert_eq!(result.segments[2].text, "out.txt");
        assert_eq!(result.segments[2].kind, PipeSegmentKind::File);
        assert!(result.has_redirect);
        assert_eq!(result.redirect_mode, Some(RedirectMode::Overwrite));
        assert_eq!(result.redirect_target.as_deref(), Some("out.txt"));
    }

    #[test]
    fn append_redirect() {
        let result = parse_pipe("/list >> out.txt");
        assert_eq!(result.redirect_mode, Some(RedirectMode::Append));
    }

    #[test]
    fn double_pipe_is_not_split() {
        let result = parse_pipe("/a || /b");
        assert_eq!(result.segments.len(), 1);
        assert_eq!(result.segments[0].text, "/a || /b");
    }

    #[test]
    fn pipe_inside_quotes_is_not_split() {
        let result = parse_pipe(r#"/echo "a | b""#);
        assert_eq!(result.segments.len(), 1);
    }
}

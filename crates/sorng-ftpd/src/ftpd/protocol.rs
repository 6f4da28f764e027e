//! Reply codes and the reply grammar (RFC 959 §4.2).
//!
//! ```text
//! 200 single line
//!
//! 211-first line
//!  body line
//! 211 last line
//! ```

pub const STATUS_OK: u16 = 200;
pub const STATUS_SYSTEM_STATUS: u16 = 211;
pub const STATUS_FILE_STATUS: u16 = 213;
pub const STATUS_SYSTEM_TYPE: u16 = 215;
pub const STATUS_SERVICE_READY: u16 = 220;
pub const STATUS_CLOSING_CONTROL_CONN: u16 = 221;
pub const STATUS_AUTH_ACCEPTED: u16 = 234;
pub const STATUS_FILE_OK: u16 = 250;
pub const STATUS_SYNTAX_ERROR_NOT_RECOGNISED: u16 = 500;
pub const STATUS_SYNTAX_ERROR_PARAMETERS: u16 = 501;
pub const STATUS_BAD_COMMAND_SEQUENCE: u16 = 503;
pub const STATUS_ACTION_NOT_TAKEN: u16 = 550;
pub const STATUS_ACTION_NOT_TAKEN_NO_FILE: u16 = 553;

/// `"%03d %s\r\n"`.
pub fn format_line(code: u16, text: &str) -> String {
    format!("{:03} {}\r\n", code, text)
}

/// Render a reply whose message may span several lines.
///
/// One line gives `code text`; more give `code-first`, ` middle`…, `code last`.
pub fn format_message(code: u16, message: &str) -> String {
    let lines: Vec<&str> = message.lines().collect();
    match lines.as_slice() {
        [] => format_line(code, ""),
        [only] => format_line(code, only),
        [first, middle @ .., last] => {
            let mut out = format!("{:03}-{}\r\n", code, first);
            for line in middle {
                out.push_str(&format!(" {}\r\n", line));
            }
            out.push_str(&format_line(code, last));
            out
        }
    }
}

/// Render a delimited block: `code-header`, ` body`…, `code footer`.
pub fn format_multiline<S: AsRef<str>>(code: u16, header: &str, body: &[S], footer: &str) -> String {
    let mut out = format!("{:03}-{}\r\n", code, header);
    for line in body {
        out.push_str(&format!(" {}\r\n", line.as_ref()));
    }
    out.push_str(&format_line(code, footer));
    out
}

/// Split a raw command line into an upper-cased verb and its parameter.
pub fn split_command(line: &str) -> (String, String) {
    let line = line.trim_end_matches(|c| c == '\r' || c == '\n');
    match line.split_once(' ') {
        Some((verb, param)) => (verb.to_ascii_uppercase(), param.to_string()),
        None => (line.to_ascii_uppercase(), String::new()),
    }
}

//! Command encoding
//!
//! A command is always sent as an array of bulk strings:
//! `*<argc>\r\n` then `$<len>\r\n<bytes>\r\n` per argument, where `len` is the
//! UTF-8 byte length of the argument.

/// Encode a command into a fresh buffer
pub fn encode_command<S: AsRef<str>>(args: &[S]) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_command_into(&mut buf, args);
    buf
}

/// Append an encoded command to `buf`, so several commands can share one write
pub fn encode_command_into<S: AsRef<str>>(buf: &mut Vec<u8>, args: &[S]) {
    let payload: usize = args.iter().map(|a| a.as_ref().len() + 16).sum();
    buf.reserve(payload + 16);

    buf.push(b'*');
    buf.extend_from_slice(args.len().to_string().as_bytes());
    buf.extend_from_slice(b"\r\n");
    for arg in args {
        let bytes = arg.as_ref().as_bytes();
        buf.push(b'$');
        buf.extend_from_slice(bytes.len().to_string().as_bytes());
        buf.extend_from_slice(b"\r\n");
        buf.extend_from_slice(bytes);
        buf.extend_from_slice(b"\r\n");
    }
}

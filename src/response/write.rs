use bytes::BufMut;

use crate::headers::Header;

/// Write the CGI response head into buffer.
///
/// The head is a `Status` line, one line per header, then an empty line,
/// each terminated by CRLF.
pub fn write_head<B: BufMut>(status: &str, headers: &[Header], mut bufm: B) {
    bufm.put_slice(b"Status: ");
    bufm.put_slice(status.as_bytes());
    bufm.put_slice(b"\r\n");

    for header in headers {
        bufm.put_slice(header.name());
        bufm.put_slice(b": ");
        bufm.put_slice(header.value());
        bufm.put_slice(b"\r\n");
    }

    bufm.put_slice(b"\r\n");
}

/// Returns the exact length of the head written by [`write_head`].
pub fn head_len(status: &str, headers: &[Header]) -> usize {
    let headers: usize = headers
        .iter()
        .map(|h| h.name().len() + h.value().len() + 4)
        .sum();
    b"Status: ".len() + status.len() + 2 + headers + 2
}

use std::io::{self, Write};

pub fn write_stdout_text(text: &str) -> io::Result<()> {
    write_stdout_chunks(&[text.as_bytes()])
}

pub fn write_stdout_line(text: &str) -> io::Result<()> {
    write_stdout_chunks(&[text.as_bytes(), b"\n"])
}

/// A reader closing the pipe early (`tallyfeed layouts | head`) is not an error.
fn write_stdout_chunks(chunks: &[&[u8]]) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    let written = chunks
        .iter()
        .try_for_each(|chunk| stdout.write_all(chunk))
        .and_then(|()| stdout.flush());
    match written {
        Err(error) if error.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

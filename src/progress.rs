//! Byte-counting reader used to drive the spinner while a dump is loaded.

use std::io::Read;

/// Wraps a reader and reports the running total of bytes pulled through it.
///
/// The count is taken before decompression, so for compressed dumps it
/// tracks the on-disk size rather than the SQL text size.
pub struct ProgressReader<R: Read> {
    inner: R,
    on_read: Box<dyn Fn(u64)>,
    total: u64,
}

impl<R: Read> ProgressReader<R> {
    pub fn new<F>(inner: R, on_read: F) -> Self
    where
        F: Fn(u64) + 'static,
    {
        Self {
            inner,
            on_read: Box::new(on_read),
            total: 0,
        }
    }

    pub fn bytes_read(&self) -> u64 {
        self.total
    }
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.total += n as u64;
        (self.on_read)(self.total);
        Ok(n)
    }
}

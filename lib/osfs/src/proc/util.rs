/// Copies the part of `src` that lies at or after `*offset` into `dest`.
///
/// Generated files rebuild their whole content on every read and use this to
/// skip what earlier reads already delivered: `*offset` counts bytes still to
/// be skipped. A line lying wholly before the offset is consumed from it and
/// nothing is copied; otherwise the tail from the offset on is copied (as much
/// as fits) and the offset drops to zero. Returns the number of bytes copied.
pub fn proc_memcpy(src: &[u8], dest: &mut [u8], offset: &mut usize) -> usize {
    if *offset >= src.len() {
        *offset -= src.len();
        return 0;
    }
    let tail = &src[*offset..];
    *offset = 0;
    let len = tail.len().min(dest.len());
    dest[..len].copy_from_slice(&tail[..len]);
    len
}

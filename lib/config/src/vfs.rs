use bitflags::bitflags;

bitflags! {
    /// Flags accepted by `open(2)`, with the values of
    /// `<bits/fcntl-linux.h>`.
    ///
    /// The two low bits hold the access mode. `O_RDONLY` is zero, so ask
    /// [`OpenFlags::readable`] rather than testing for it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenFlags: i32 {
        const O_RDONLY      = 0;
        const O_WRONLY      = 1;
        const O_RDWR        = 2;

        const O_CREAT       = 0o100;
        const O_APPEND      = 0o2000;
        const O_NONBLOCK    = 0o4000;
        const O_CLOEXEC     = 0o2000000;
    }
}

impl OpenFlags {
    /// Anything but write-only can be read.
    pub fn readable(&self) -> bool {
        !self.contains(Self::O_WRONLY)
    }

    pub fn writable(&self) -> bool {
        self.contains(Self::O_RDWR) || self.contains(Self::O_WRONLY)
    }
}

/// Origin of an `lseek(2)`.
#[derive(Copy, PartialEq, Eq, Clone, Debug)]
pub enum SeekFrom {
    Start(u64),
    /// Relative to the file size.
    End(i64),
    Current(i64),
}

#[cfg(test)]
mod tests {
    use super::OpenFlags;

    #[test]
    fn access_modes() {
        assert!(OpenFlags::O_RDONLY.readable());
        assert!(!OpenFlags::O_RDONLY.writable());
        assert!(!OpenFlags::O_WRONLY.readable());
        assert!(OpenFlags::O_WRONLY.writable());
        assert!(OpenFlags::O_RDWR.readable());
        assert!(OpenFlags::O_RDWR.writable());
        // Creation and status flags don't change the access mode.
        let flags = OpenFlags::O_RDONLY | OpenFlags::O_CLOEXEC | OpenFlags::O_NONBLOCK;
        assert!(flags.readable() && !flags.writable());
        let flags = OpenFlags::O_WRONLY | OpenFlags::O_CREAT | OpenFlags::O_APPEND;
        assert!(!flags.readable() && flags.writable());
    }
}

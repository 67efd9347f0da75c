use bitflags::bitflags;

bitflags! {
    /// File type and permission bits of `st_mode`, see `man 7 inode`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct InodeMode: u32 {
        /// Type.
        const TYPE_MASK = 0o170000;
        /// FIFO.
        const FIFO  = 0o010000;
        /// Character device.
        const CHAR  = 0o020000;
        /// Directory
        const DIR   = 0o040000;
        /// Block device
        const BLOCK = 0o060000;
        /// Regular file.
        const FILE  = 0o100000;
        /// Symbolic link.
        const LINK  = 0o120000;
        /// Socket
        const SOCKET = 0o140000;

        /// Set-user-ID on execution.
        const SET_UID = 0o4000;
        /// Set-group-ID on execution.
        const SET_GID = 0o2000;
        /// Sticky bit.
        const STICKY = 0o1000;

        /// Read, write, execute/search by owner.
        const OWNER_MASK = 0o700;
        /// Read permission, owner.
        const OWNER_READ = 0o400;
        /// Write permission, owner.
        const OWNER_WRITE = 0o200;
        /// Execute/search permission, owner.
        const OWNER_EXEC = 0o100;

        /// Read, write, execute/search by group.
        const GROUP_MASK = 0o70;
        /// Read permission, group.
        const GROUP_READ = 0o40;
        /// Write permission, group.
        const GROUP_WRITE = 0o20;
        /// Execute/search permission, group.
        const GROUP_EXEC = 0o10;

        /// Read, write, execute/search by others.
        const OTHER_MASK = 0o7;
        /// Read permission, others.
        const OTHER_READ = 0o4;
        /// Write permission, others.
        const OTHER_WRITE = 0o2;
        /// Execute/search permission, others.
        const OTHER_EXEC = 0o1;
    }
}

impl InodeMode {
    /// Read-only regular file, readable by owner, group and others.
    pub const READONLY_FILE: Self = Self::FILE
        .union(Self::OWNER_READ)
        .union(Self::GROUP_READ)
        .union(Self::OTHER_READ);

    pub fn to_type(&self) -> InodeType {
        InodeType::from(*self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InodeType {
    Fifo,
    CharDevice,
    Dir,
    BlockDevice,
    File,
    SymLink,
    Socket,
    Unknown,
}

impl InodeType {
    pub fn is_reg(&self) -> bool {
        *self == InodeType::File
    }

    pub fn is_dir(&self) -> bool {
        *self == InodeType::Dir
    }
}

impl From<InodeMode> for InodeType {
    fn from(mode: InodeMode) -> Self {
        match mode.intersection(InodeMode::TYPE_MASK) {
            InodeMode::FIFO => InodeType::Fifo,
            InodeMode::CHAR => InodeType::CharDevice,
            InodeMode::DIR => InodeType::Dir,
            InodeMode::BLOCK => InodeType::BlockDevice,
            InodeMode::FILE => InodeType::File,
            InodeMode::LINK => InodeType::SymLink,
            InodeMode::SOCKET => InodeType::Socket,
            _ => InodeType::Unknown,
        }
    }
}

use bitflags::bitflags;

bitflags! {
    /// Access and scope modifiers attached to types and their members.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u16 {
        const PUBLIC            = 0x0001;
        const PROTECTED         = 0x0002;
        const PRIVATE           = 0x0004;
        const STATIC            = 0x0010;
        const ABSTRACT          = 0x0020;
        const EXPLICIT_ABSTRACT = 0x0040;
        const FINAL             = 0x0080;
    }
}

impl Modifiers {
    /// Raises a modifier bit. `PUBLIC` and `PRIVATE`/`PROTECTED` are
    /// mutually exclusive: raising either restricted visibility clears
    /// `PUBLIC`.
    pub fn raise(&mut self, flag: Modifiers) {
        if flag.intersects(Modifiers::PRIVATE | Modifiers::PROTECTED) {
            self.remove(Modifiers::PUBLIC);
        }
        self.insert(flag);
    }

    pub fn is_public(self) -> bool {
        self.contains(Modifiers::PUBLIC)
    }

    pub fn is_protected(self) -> bool {
        self.contains(Modifiers::PROTECTED)
    }

    pub fn is_private(self) -> bool {
        self.contains(Modifiers::PRIVATE)
    }

    pub fn is_static(self) -> bool {
        self.contains(Modifiers::STATIC)
    }

    pub fn is_abstract(self) -> bool {
        self.intersects(Modifiers::ABSTRACT | Modifiers::EXPLICIT_ABSTRACT)
    }

    pub fn is_final(self) -> bool {
        self.contains(Modifiers::FINAL)
    }
}

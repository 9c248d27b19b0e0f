#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(C)]
pub struct Id(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(C)]
pub struct IdType(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(C)]
pub struct IdCategory(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(C)]
pub struct Bp(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Id {
    #[inline]
    pub fn ix(&self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for Id {
    fn from(u: u32) -> Id {
        Id(u)
    }
}

impl From<Id> for u32 {
    fn from(id: Id) -> u32 {
        id.0
    }
}

impl From<usize> for Id {
    fn from(u: usize) -> Id {
        Id(u as u32)
    }
}

impl IdType {
    #[inline]
    pub fn ix(&self) -> usize {
        self.0 as usize
    }
}

impl IdCategory {
    #[inline]
    pub fn ix(&self) -> usize {
        self.0 as usize
    }
}

impl From<u64> for Bp {
    fn from(u: u64) -> Bp {
        Bp(u)
    }
}

impl From<Bp> for u64 {
    fn from(bp: Bp) -> u64 {
        bp.0
    }
}

impl Strand {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "+" => Some(Strand::Forward),
            "-" => Some(Strand::Reverse),
            _ => None,
        }
    }
}

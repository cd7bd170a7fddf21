use modular_bitfield::bitfield;
use std::fmt::{Display, Formatter};

/// Game version as stored in blueprints: four 16-bit parts packed into one integer, most significant first.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Default)]
pub struct Version {
    pub main: u16,
    pub major: u16,
    pub minor: u16,
    pub developer: u16,
}

#[bitfield(bits = 64)]
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
struct PackedVersion {
    developer: u16,
    minor: u16,
    major: u16,
    main: u16,
}

impl Version {
    pub const fn new(main: u16, major: u16, minor: u16, developer: u16) -> Self {
        Version {
            main,
            major,
            minor,
            developer,
        }
    }

    pub fn pack(self) -> u64 {
        let packed = PackedVersion::new()
            .with_main(self.main)
            .with_major(self.major)
            .with_minor(self.minor)
            .with_developer(self.developer);
        u64::from_le_bytes(packed.into_bytes())
    }

    pub fn unpack(value: u64) -> Self {
        let packed = PackedVersion::from_bytes(value.to_le_bytes());
        Version::new(packed.main(), packed.major(), packed.minor(), packed.developer())
    }
}

impl From<u64> for Version {
    fn from(value: u64) -> Self {
        Version::unpack(value)
    }
}

impl From<Version> for u64 {
    fn from(value: Version) -> Self {
        value.pack()
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.main, self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use crate::codec::version::Version;

    #[test]
    fn test_pack() {
        let version = Version::new(1, 1, 110, 0);
        assert_eq!(version.pack(), (1 << 48) | (1 << 32) | (110 << 16));
        assert_eq!(Version::unpack(281479278886912), version);
        assert_eq!(Version::unpack(version.pack()), version);
        assert_eq!(Version::new(0, 17, 14, 3).pack(), (17 << 32) | (14 << 16) | 3);
    }

    #[test]
    fn test_order_and_display() {
        assert!(Version::new(0, 17, 0, 0) < Version::new(0, 17, 10, 0));
        assert!(Version::new(0, 18, 0, 0) > Version::new(0, 17, 79, 2));
        assert!(Version::new(1, 1, 11, 0) > Version::new(1, 1, 10, 65535));
        assert_eq!(Version::new(1, 1, 110, 0).to_string(), "1.1.110");
    }
}

//! Access and property flags (JVMS 4.1, 4.5, 4.6).

pub const PUBLIC: u16 = 0x0001;
pub const PRIVATE: u16 = 0x0002;
pub const PROTECTED: u16 = 0x0004;
pub const STATIC: u16 = 0x0008;
pub const FINAL: u16 = 0x0010;
/// Class flag; shares its bit with `ACC_SYNCHRONIZED` on methods.
pub const SUPER: u16 = 0x0020;
pub const SYNCHRONIZED: u16 = 0x0020;
pub const VOLATILE: u16 = 0x0040;
pub const BRIDGE: u16 = 0x0040;
pub const TRANSIENT: u16 = 0x0080;
pub const VARARGS: u16 = 0x0080;
pub const NATIVE: u16 = 0x0100;
pub const INTERFACE: u16 = 0x0200;
pub const ABSTRACT: u16 = 0x0400;
pub const STRICT: u16 = 0x0800;
pub const SYNTHETIC: u16 = 0x1000;
pub const ANNOTATION: u16 = 0x2000;
pub const ENUM: u16 = 0x4000;

/// Which table a flag word belongs to; the same bit means different things.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlagTarget {
    Class,
    Field,
    Method,
}

/// Java keywords for a flag word, in javap order.
pub fn keywords(flags: u16, target: FlagTarget) -> Vec<&'static str> {
    let mut table: Vec<(u16, &'static str)> = vec![
        (PUBLIC, "public"),
        (PRIVATE, "private"),
        (PROTECTED, "protected"),
        (STATIC, "static"),
        (FINAL, "final"),
    ];
    match target {
        FlagTarget::Class => {
            table.push((ABSTRACT, "abstract"));
            table.push((INTERFACE, "interface"));
        }
        FlagTarget::Field => {
            table.push((VOLATILE, "volatile"));
            table.push((TRANSIENT, "transient"));
        }
        FlagTarget::Method => {
            table.push((SYNCHRONIZED, "synchronized"));
            table.push((NATIVE, "native"));
            table.push((ABSTRACT, "abstract"));
        }
    }
    table
        .into_iter()
        .filter(|(bit, _)| flags & bit != 0)
        .map(|(_, word)| word)
        .collect()
}

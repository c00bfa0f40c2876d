use std::fmt;

/// A metadata token identifying a row in a metadata table.
///
/// Tokens are 32-bit values where the high byte selects the table and the low
/// 24 bits carry the 1-based row id. A row id of zero means "no reference".
/// Tokens are the identity key of every member in the object model: equality
/// and hashing are structural over the raw value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token(pub u32);

impl Token {
    /// Creates a new token from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Returns the raw token value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Extracts the table index from the token (high byte)
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Extracts the row id from the token (low 24 bits)
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Returns true if the token references no row
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.row() == 0
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn decomposition() {
        let token = Token::new(0x0600_0001);
        assert_eq!(token.table(), 0x06);
        assert_eq!(token.row(), 1);
        assert_eq!(token.value(), 0x0600_0001);

        let token = Token(0x06FF_FFFF);
        assert_eq!(token.row(), 0x00FF_FFFF);

        let token = Token(0x0200_0000);
        assert_eq!(token.table(), 0x02);
        assert_eq!(token.row(), 0);
    }

    #[test]
    fn null_is_rid_zero() {
        assert!(Token(0).is_null());
        assert!(Token(0x0200_0000).is_null());
        assert!(!Token(0x0200_0001).is_null());
    }

    #[test]
    fn round_trip() {
        let value = 0x0600_0001_u32;
        let token: Token = value.into();
        let back: u32 = token.into();
        assert_eq!(back, value);
    }

    #[test]
    fn formatting() {
        let token = Token(0x0600_0001);
        assert_eq!(format!("{}", token), "0x06000001");
        let debug = format!("{:?}", token);
        assert!(debug.contains("table: 0x06"));
        assert!(debug.contains("row: 1"));
    }

    #[test]
    fn usable_as_map_key() {
        let mut map = HashMap::new();
        map.insert(Token(0x0600_0001), "one");
        map.insert(Token(0x0600_0002), "two");

        assert_eq!(map.get(&Token(0x0600_0001)), Some(&"one"));
        assert_eq!(map.get(&Token(0x0600_0002)), Some(&"two"));
    }

    #[test]
    fn ordering_is_by_raw_value() {
        assert!(Token(0x0600_0001) < Token(0x0600_0002));
        assert!(Token(0x0600_0002) < Token(0x0700_0001));
    }
}

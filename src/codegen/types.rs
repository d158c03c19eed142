//! C type to VHDL type mapping

use crate::parser::ast::CType;

/// Width in bits of the hardware representation of a C type.
/// `void` only appears as a return type and gets the default port width.
pub fn bit_width(ty: CType) -> u32 {
    match ty {
        CType::Char => 8,
        CType::Double => 64,
        CType::Int | CType::Float | CType::Void => 32,
    }
}

pub fn ctype_to_vhdl(ty: CType) -> &'static str {
    match bit_width(ty) {
        8 => "std_logic_vector(7 downto 0)",
        64 => "std_logic_vector(63 downto 0)",
        _ => "std_logic_vector(31 downto 0)",
    }
}

/// Bit string for a numeric literal stored in an element of type `ty`:
/// two's complement for `int` and `char`, IEEE-754 for `float`/`double`.
/// Returns `None` when `text` is not a number.
pub fn literal_bits(ty: CType, text: &str) -> Option<String> {
    match ty {
        CType::Float => text.parse::<f32>().ok().map(|v| format!("{:032b}", v.to_bits())),
        CType::Double => text.parse::<f64>().ok().map(|v| format!("{:064b}", v.to_bits())),
        CType::Char => integer_value(text).map(|v| format!("{:08b}", v as u8)),
        CType::Int | CType::Void => integer_value(text).map(|v| format!("{:032b}", v as u32)),
    }
}

/// Integer value of a literal; fractional literals truncate toward zero
fn integer_value(text: &str) -> Option<i64> {
    text.parse::<i64>()
        .ok()
        .or_else(|| text.parse::<f64>().ok().map(|v| v.trunc() as i64))
}

/// All-zero bit string of the width of `ty`
pub fn zero_bits(ty: CType) -> String {
    "0".repeat(bit_width(ty) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mapping() {
        assert_eq!(ctype_to_vhdl(CType::Int), "std_logic_vector(31 downto 0)");
        assert_eq!(ctype_to_vhdl(CType::Float), "std_logic_vector(31 downto 0)");
        assert_eq!(ctype_to_vhdl(CType::Void), "std_logic_vector(31 downto 0)");
        assert_eq!(ctype_to_vhdl(CType::Char), "std_logic_vector(7 downto 0)");
        assert_eq!(ctype_to_vhdl(CType::Double), "std_logic_vector(63 downto 0)");
    }

    #[test]
    fn test_literal_bits() {
        assert_eq!(
            literal_bits(CType::Int, "5").as_deref(),
            Some("00000000000000000000000000000101")
        );
        assert_eq!(
            literal_bits(CType::Int, "-1").as_deref(),
            Some("11111111111111111111111111111111")
        );
        assert_eq!(literal_bits(CType::Char, "65").as_deref(), Some("01000001"));
        // 1.0f32 = 0x3F800000
        assert_eq!(
            literal_bits(CType::Float, "1.0").as_deref(),
            Some("00111111100000000000000000000000")
        );
        assert_eq!(literal_bits(CType::Double, "2").map(|b| b.len()), Some(64));
        assert_eq!(literal_bits(CType::Int, "x"), None);
    }

    #[test]
    fn test_fraction_truncates_for_integers() {
        assert_eq!(literal_bits(CType::Int, "2.9"), literal_bits(CType::Int, "2"));
    }
}

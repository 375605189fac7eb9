// Segment wiring, MSB first: a b c d e f g dp
// Segments are active-low, so a cleared bit lights the segment.
pub const SEGMENT_A: u8 = 0b0111_1111;
pub const SEGMENT_B: u8 = 0b1011_1111;
pub const SEGMENT_C: u8 = 0b1101_1111;
pub const SEGMENT_D: u8 = 0b1110_1111;
pub const SEGMENT_E: u8 = 0b1111_0111;
pub const SEGMENT_F: u8 = 0b1111_1011;
pub const SEGMENT_G: u8 = 0b1111_1101;
pub const SEGMENT_DP: u8 = 0b1111_1110;

/// All segments dark
pub const BLANK: u8 = 0xFF;

/// Segment patterns for 0-9
pub const DIGITS: [u8; 10] = [
    SEGMENT_A & SEGMENT_B & SEGMENT_C & SEGMENT_D & SEGMENT_E & SEGMENT_F, // 0
    SEGMENT_B & SEGMENT_C,                                                 // 1
    SEGMENT_A & SEGMENT_B & SEGMENT_D & SEGMENT_E & SEGMENT_G,             // 2
    SEGMENT_A & SEGMENT_B & SEGMENT_C & SEGMENT_D & SEGMENT_G,             // 3
    SEGMENT_B & SEGMENT_C & SEGMENT_F & SEGMENT_G,                         // 4
    SEGMENT_A & SEGMENT_C & SEGMENT_D & SEGMENT_F & SEGMENT_G,             // 5
    SEGMENT_C & SEGMENT_D & SEGMENT_E & SEGMENT_F & SEGMENT_G,             // 6
    SEGMENT_A & SEGMENT_B & SEGMENT_C,                                     // 7
    SEGMENT_A & SEGMENT_B & SEGMENT_C & SEGMENT_D & SEGMENT_E & SEGMENT_F & SEGMENT_G, // 8
    SEGMENT_A & SEGMENT_B & SEGMENT_C & SEGMENT_D & SEGMENT_F & SEGMENT_G, // 9
];

/// Segment pattern for a single decimal digit.
///
/// Callers split bounded clock fields with `/ 10` and `% 10`, so anything
/// above 9 is a bug at the call site.
pub fn encode(digit: u8) -> u8 {
    debug_assert!(digit <= 9, "digit out of range: {digit}");
    DIGITS[digit as usize % DIGITS.len()]
}

/// Reverse lookup, ignoring the decimal point segment
pub fn decode(pattern: u8) -> Option<u8> {
    let pattern = pattern | !SEGMENT_DP;
    DIGITS
        .iter()
        .position(|&d| d == pattern)
        .map(|d| d as u8)
}

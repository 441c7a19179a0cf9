//! The intercepted transmission for the decryption test.
//!
//! The transmission is the fixed plaintext run through a Caesar shift. Only
//! the plaintext comparison decides pass or fail; the scrambled text is
//! display material.

/// Plaintext the applicant must produce.
pub const PLAINTEXT: &str = "See the shadows, become the GLITCH!";

/// Right shift applied to letters in the transmission.
const SHIFT: u8 = 3;

/// The scrambled transmission shown on the decryption screen.
pub fn transmission() -> String {
    shift_letters(PLAINTEXT, SHIFT)
}

/// True when the input matches the plaintext, ignoring case and surrounding
/// whitespace.
pub fn check_answer(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case(PLAINTEXT)
}

/// Shift ASCII letters right by `by` positions, wrapping within the alphabet.
/// Case and non-letter characters are preserved.
fn shift_letters(text: &str, by: u8) -> String {
    text.chars()
        .map(|c| match c {
            'a'..='z' => rotate(c, b'a', by),
            'A'..='Z' => rotate(c, b'A', by),
            _ => c,
        })
        .collect()
}

fn rotate(c: char, base: u8, by: u8) -> char {
    (((c as u8 - base + by) % 26) + base) as char
}

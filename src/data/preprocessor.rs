// ============================================================
// Layer 4 — Transcript Preprocessor
// ============================================================
// Call transcripts arrive from speech-to-text exports and
// carry noise the tokenizer would otherwise count as tokens:
//   - non-breaking / zero-width spaces and BOMs
//   - tabs and Windows line endings
//   - control characters
//   - runs of whitespace across speaker turns
//
// The classifier sees a transcript as one sequence, so every
// line break is folded into a single space.

pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Normalise a transcript into a single whitespace-collapsed line.
    pub fn clean(&self, text: &str) -> String {
        let mut out        = String::with_capacity(text.len());
        let mut last_space = true;

        for c in text.chars() {
            let c = match c {
                '\u{00A0}' | '\u{200B}' | '\u{FEFF}' => ' ',
                c if c.is_whitespace() || c.is_control() => ' ',
                c => c,
            };

            if c == ' ' {
                if !last_space {
                    out.push(' ');
                }
                last_space = true;
            } else {
                out.push(c);
                last_space = false;
            }
        }

        // At most one trailing space can remain
        if out.ends_with(' ') {
            out.pop();
        }
        out
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

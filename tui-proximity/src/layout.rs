use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// One grapheme cluster of the label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph {
    pub word: usize,
    /// Position within its word.
    pub letter: usize,
    pub symbol: String,
    /// Offset in terminal columns from the start of the label.
    pub column: u16,
    pub width: u16,
}

/// Word-major, then letter-major. Words are separated by single spaces, each
/// of which takes one column but is not a glyph itself. Runs of spaces yield
/// empty words, so every space still takes up its column.
pub fn split_label(label: &str) -> Vec<Glyph> {
    let mut glyphs = Vec::new();
    let mut column: u16 = 0;

    for (word, text) in label.split(' ').enumerate() {
        if word > 0 {
            column = column.saturating_add(1);
        }

        for (letter, symbol) in text.graphemes(true).enumerate() {
            let width = u16::try_from(symbol.width()).unwrap_or(u16::MAX);

            glyphs.push(Glyph {
                word,
                letter,
                symbol: symbol.to_owned(),
                column,
                width,
            });

            column = column.saturating_add(width);
        }
    }

    glyphs
}

/// Columns occupied by the whole label, spaces included.
pub fn label_width(label: &str) -> u16 {
    let spaces = label.matches(' ').count();
    let letters: usize = label.split(' ').map(UnicodeWidthStr::width).sum();

    u16::try_from(letters + spaces).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(glyphs: &[Glyph]) -> Vec<&str> {
        glyphs.iter().map(|g| g.symbol.as_str()).collect()
    }

    #[test]
    fn reading_order_is_word_then_letter() {
        let glyphs = split_label("Hi you");

        assert_eq!(symbols(&glyphs), ["H", "i", "y", "o", "u"]);
        assert_eq!(
            glyphs.iter().map(|g| (g.word, g.letter)).collect::<Vec<_>>(),
            [(0, 0), (0, 1), (1, 0), (1, 1), (1, 2)]
        );
    }

    #[test]
    fn spaces_take_a_column_but_are_not_glyphs() {
        let glyphs = split_label("a b");

        assert_eq!(glyphs.len(), 2);
        assert_eq!(glyphs[0].column, 0);
        assert_eq!(glyphs[1].column, 2);
        assert_eq!(label_width("a b"), 3);
    }

    #[test]
    fn repeated_spaces_are_preserved() {
        let glyphs = split_label("a  b");

        assert_eq!(glyphs[1].word, 2);
        assert_eq!(glyphs[1].column, 3);
        assert_eq!(label_width("a  b"), 4);
    }

    #[test]
    fn graphemes_stay_whole() {
        let glyphs = split_label("e\u{301}t");

        assert_eq!(symbols(&glyphs), ["e\u{301}", "t"]);
        assert_eq!(glyphs[1].column, 1);
    }

    #[test]
    fn wide_glyphs_advance_two_columns() {
        let glyphs = split_label("日本");

        assert_eq!(glyphs[0].width, 2);
        assert_eq!(glyphs[1].column, 2);
        assert_eq!(label_width("日本"), 4);
    }

    #[test]
    fn empty_label_has_no_glyphs() {
        assert!(split_label("").is_empty());
        assert_eq!(label_width(""), 0);
    }
}

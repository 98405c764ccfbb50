// crates/cypherqa-core/src/utils.rs

pub mod wrap {
    use unicode_segmentation::UnicodeSegmentation;

    pub const DEFAULT_WIDTH: usize = 60;

    /// Fill `text` into lines of at most `width` graphemes.
    ///
    /// Whitespace runs (newlines included) collapse to a single space and
    /// words wider than `width` are split across lines.
    pub fn fill(text: &str, width: usize) -> String {
        wrap(text, width).join("\n")
    }

    pub fn wrap(text: &str, width: usize) -> Vec<String> {
        let width = width.max(1);
        let mut lines = Vec::new();
        let mut line = String::new();
        let mut line_len = 0;

        for word in text.split_whitespace() {
            let graphemes: Vec<&str> = word.graphemes(true).collect();

            if graphemes.len() > width {
                // Long words start on a fresh line unless they fit after a
                // space, then get cut into width-sized pieces.
                let mut rest = &graphemes[..];
                if line_len > 0 {
                    let room = width.saturating_sub(line_len + 1);
                    if room > 0 {
                        line.push(' ');
                        line.push_str(&rest[..room].concat());
                        rest = &rest[room..];
                    }
                    lines.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                while rest.len() > width {
                    lines.push(rest[..width].concat());
                    rest = &rest[width..];
                }
                line = rest.concat();
                line_len = rest.len();
                continue;
            }

            let needed = if line_len == 0 { graphemes.len() } else { line_len + 1 + graphemes.len() };
            if needed > width {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line.push_str(word);
            line_len += graphemes.len();
        }

        if line_len > 0 {
            lines.push(line);
        }
        lines
    }

}

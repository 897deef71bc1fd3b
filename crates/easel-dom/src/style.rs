//! Inline Style
//!
//! The `style` attribute as an ordered declaration list. Property names
//! are stored lowercase; values are kept verbatim (trimmed).

/// Single `property: value [!important]` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

impl Declaration {
    pub fn new(property: &str, value: &str, important: bool) -> Self {
        Self {
            property: property.trim().to_ascii_lowercase(),
            value: value.trim().to_string(),
            important,
        }
    }
}

/// Ordered inline declaration block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    declarations: Vec<Declaration>,
}

impl InlineStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `style` attribute text
    ///
    /// Malformed entries (no colon, empty name or value) are skipped the
    /// way a browser drops invalid declarations.
    pub fn parse(text: &str) -> Self {
        let mut style = Self::new();
        for entry in split_declarations(text) {
            let Some((name, raw_value)) = entry.split_once(':') else {
                continue;
            };
            let name = name.trim();
            let mut value = raw_value.trim();
            let mut important = false;
            if let Some(stripped) = strip_important(value) {
                value = stripped;
                important = true;
            }
            if name.is_empty() || value.is_empty() {
                continue;
            }
            style.set(name, value, important);
        }
        style
    }

    /// Get a declaration value
    pub fn get(&self, property: &str) -> Option<&str> {
        self.find(property).map(|d| d.value.as_str())
    }

    /// Get the full declaration (value and priority)
    pub fn declaration(&self, property: &str) -> Option<&Declaration> {
        self.find(property)
    }

    /// Whether the declaration carries `!important`
    pub fn is_important(&self, property: &str) -> bool {
        self.find(property).is_some_and(|d| d.important)
    }

    /// Set a declaration, replacing any previous value in place
    pub fn set(&mut self, property: &str, value: &str, important: bool) {
        let decl = Declaration::new(property, value, important);
        if let Some(existing) = self
            .declarations
            .iter_mut()
            .find(|d| d.property == decl.property)
        {
            *existing = decl;
        } else {
            self.declarations.push(decl);
        }
    }

    /// Remove a declaration, returning it
    pub fn remove(&mut self, property: &str) -> Option<Declaration> {
        let property = property.trim().to_ascii_lowercase();
        let index = self.declarations.iter().position(|d| d.property == property)?;
        Some(self.declarations.remove(index))
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn clear(&mut self) {
        self.declarations.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter()
    }

    /// Render back to attribute text
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        for decl in &self.declarations {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&decl.property);
            out.push_str(": ");
            out.push_str(&decl.value);
            if decl.important {
                out.push_str(" !important");
            }
            out.push(';');
        }
        out
    }

    fn find(&self, property: &str) -> Option<&Declaration> {
        let property = property.trim();
        self.declarations
            .iter()
            .find(|d| d.property.eq_ignore_ascii_case(property))
    }
}

impl std::fmt::Display for InlineStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_css())
    }
}

/// Split on `;` outside of parentheses and quotes
fn split_declarations(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

fn strip_important(value: &str) -> Option<&str> {
    let bang = value.rfind('!')?;
    let flag = value[bang + 1..].trim();
    if flag.eq_ignore_ascii_case("important") {
        Some(value[..bang].trim_end())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_render() {
        let style = InlineStyle::parse("color: red; width:120px !important;;bogus");

        assert_eq!(style.len(), 2);
        assert_eq!(style.get("color"), Some("red"));
        assert_eq!(style.get("WIDTH"), Some("120px"));
        assert!(style.is_important("width"));
        assert_eq!(style.to_css(), "color: red; width: 120px !important;");
    }

    #[test]
    fn test_semicolon_inside_parens() {
        let style = InlineStyle::parse("background: url(\"a;b.png\"); color: rgb(1, 2, 3)");
        assert_eq!(style.get("background"), Some("url(\"a;b.png\")"));
        assert_eq!(style.get("color"), Some("rgb(1, 2, 3)"));
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut style = InlineStyle::parse("a: 1; b: 2");
        style.set("a", "3", true);

        assert_eq!(style.to_css(), "a: 3 !important; b: 2;");
        assert!(style.remove("a").is_some());
        assert!(style.remove("a").is_none());
        assert_eq!(style.to_css(), "b: 2;");
    }
}

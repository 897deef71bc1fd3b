//! Selector Matching
//!
//! querySelector, closest, matches over the arena tree. Supports type,
//! universal, id, class and attribute selectors, compound sequences,
//! descendant and child combinators, and comma-separated lists.

use crate::{DomError, DomResult, DomTree, NodeId};

/// Attribute selector (`[name]`, `[name op value]`)
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSelector {
    pub name: String,
    pub matcher: Option<AttributeMatcher>,
    pub case_insensitive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeMatcher {
    /// [attr=value] - exact match
    Exact(String),
    /// [attr~=value] - whitespace-separated list contains
    Contains(String),
    /// [attr|=value] - exact or prefix with hyphen
    DashMatch(String),
    /// [attr^=value] - starts with
    Prefix(String),
    /// [attr$=value] - ends with
    Suffix(String),
    /// [attr*=value] - contains substring
    Substring(String),
}

impl AttributeSelector {
    /// Check if an attribute value matches
    pub fn matches(&self, value: Option<&str>) -> bool {
        match (&self.matcher, value) {
            (None, Some(_)) => true,
            (None, None) => false,
            (Some(_), None) => false,
            (Some(matcher), Some(val)) => {
                let fold = |s: &str| {
                    if self.case_insensitive {
                        s.to_lowercase()
                    } else {
                        s.to_string()
                    }
                };
                let val = fold(val);
                match matcher {
                    AttributeMatcher::Exact(expected) => val == fold(expected),
                    AttributeMatcher::Contains(expected) => {
                        let expected = fold(expected);
                        val.split_whitespace().any(|w| w == expected)
                    }
                    AttributeMatcher::DashMatch(expected) => {
                        let expected = fold(expected);
                        val == expected || val.starts_with(&format!("{}-", expected))
                    }
                    AttributeMatcher::Prefix(expected) => !expected.is_empty() && val.starts_with(&fold(expected)),
                    AttributeMatcher::Suffix(expected) => !expected.is_empty() && val.ends_with(&fold(expected)),
                    AttributeMatcher::Substring(expected) => !expected.is_empty() && val.contains(&fold(expected)),
                }
            }
        }
    }
}

/// One compound selector (`div.card#main[data-x]`)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Compound {
    /// Lowercase tag, None for `*` or omitted
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<AttributeSelector>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attributes.is_empty()
    }

    /// Match against a single element
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        let Some(elem) = tree.element(id) else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if !elem.has_tag(tag) {
                return false;
            }
        }
        if let Some(expected) = &self.id {
            if elem.id() != Some(expected.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| elem.has_class(c)) {
            return false;
        }
        self.attributes.iter().all(|attr| {
            if attr.name == "style" {
                let css = (!elem.style.is_empty()).then(|| elem.style.to_css());
                attr.matches(css.as_deref())
            } else {
                attr.matches(elem.get_attr(&attr.name))
            }
        })
    }
}

/// Relationship between two compounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
}

/// Complex selector: compounds joined by combinators
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    compounds: Vec<Compound>,
    /// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`
    combinators: Vec<Combinator>,
}

impl Selector {
    pub fn parse(text: &str) -> DomResult<Self> {
        let list = SelectorList::parse(text)?;
        let mut selectors = list.selectors;
        if selectors.len() != 1 {
            return Err(DomError::InvalidSelector(text.to_string()));
        }
        Ok(selectors.remove(0))
    }

    /// Right-to-left match with backtracking over ancestors
    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        self.match_at(tree, id, self.compounds.len() - 1)
    }

    fn match_at(&self, tree: &DomTree, id: NodeId, index: usize) -> bool {
        if !self.compounds[index].matches(tree, id) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match self.combinators[index - 1] {
            Combinator::Child => tree
                .parent(id)
                .is_some_and(|parent| self.match_at(tree, parent, index - 1)),
            Combinator::Descendant => tree
                .ancestors(id)
                .any(|ancestor| self.match_at(tree, ancestor, index - 1)),
        }
    }
}

/// Comma-separated selector list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectorList {
    selectors: Vec<Selector>,
}

impl SelectorList {
    /// Parse selector text
    pub fn parse(text: &str) -> DomResult<Self> {
        Parser::new(text).parse_list()
    }

    /// Join several selector strings into one list, skipping bad ones
    pub fn parse_lossy<S: AsRef<str>>(texts: &[S]) -> Self {
        let mut selectors = Vec::new();
        for text in texts {
            match Self::parse(text.as_ref()) {
                Ok(list) => selectors.extend(list.selectors),
                Err(err) => tracing::debug!("Ignoring selector: {}", err),
            }
        }
        Self { selectors }
    }

    /// Empty list (never matches)
    pub fn empty() -> Self {
        Self { selectors: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn matches(&self, tree: &DomTree, id: NodeId) -> bool {
        self.selectors.iter().any(|s| s.matches(tree, id))
    }
}

struct Parser<'a> {
    text: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self) -> DomError {
        DomError::InvalidSelector(self.text.to_string())
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn parse_list(mut self) -> DomResult<SelectorList> {
        let mut selectors = vec![self.parse_selector()?];
        while self.peek() == Some(',') {
            self.pos += 1;
            selectors.push(self.parse_selector()?);
        }
        if self.peek().is_some() {
            return Err(self.error());
        }
        Ok(SelectorList { selectors })
    }

    fn parse_selector(&mut self) -> DomResult<Selector> {
        self.skip_ws();
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_ws = self.skip_ws();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_ws();
                    Combinator::Child
                }
                Some(_) if had_ws => Combinator::Descendant,
                Some(_) => return Err(self.error()),
            };
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }

        Ok(Selector { compounds, combinators })
    }

    fn parse_compound(&mut self) -> DomResult<Compound> {
        let mut compound = Compound::default();
        let mut universal = false;

        match self.peek() {
            Some('*') => {
                self.pos += 1;
                universal = true;
            }
            Some(c) if is_ident_char(c) => {
                compound.tag = Some(self.ident()?.to_ascii_lowercase());
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.id = Some(self.ident()?);
                }
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attributes.push(self.attribute()?);
                }
                _ => break,
            }
        }

        if compound.is_empty() && !universal {
            return Err(self.error());
        }
        Ok(compound)
    }

    fn ident(&mut self) -> DomResult<String> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error());
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn attribute(&mut self) -> DomResult<AttributeSelector> {
        self.skip_ws();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_ws();

        let op = match self.bump() {
            Some(']') => {
                return Ok(AttributeSelector { name, matcher: None, case_insensitive: false });
            }
            Some('=') => None,
            Some(c @ ('~' | '|' | '^' | '$' | '*')) => {
                if self.bump() != Some('=') {
                    return Err(self.error());
                }
                Some(c)
            }
            _ => return Err(self.error()),
        };

        self.skip_ws();
        let value = match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.pos += 1;
                let start = self.pos;
                while self.peek().is_some_and(|c| c != q) {
                    self.pos += 1;
                }
                let value: String = self.chars[start..self.pos].iter().collect();
                if self.bump() != Some(q) {
                    return Err(self.error());
                }
                value
            }
            _ => self.ident()?,
        };

        self.skip_ws();
        let mut case_insensitive = false;
        if matches!(self.peek(), Some('i' | 'I')) {
            self.pos += 1;
            case_insensitive = true;
            self.skip_ws();
        }
        if self.bump() != Some(']') {
            return Err(self.error());
        }

        let matcher = match op {
            None => AttributeMatcher::Exact(value),
            Some('~') => AttributeMatcher::Contains(value),
            Some('|') => AttributeMatcher::DashMatch(value),
            Some('^') => AttributeMatcher::Prefix(value),
            Some('$') => AttributeMatcher::Suffix(value),
            _ => AttributeMatcher::Substring(value),
        };
        Ok(AttributeSelector { name, matcher: Some(matcher), case_insensitive })
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

impl DomTree {
    /// Check if a node matches selector text (false when unparseable)
    pub fn matches(&self, id: NodeId, selector: &str) -> bool {
        match SelectorList::parse(selector) {
            Ok(list) => list.matches(self, id),
            Err(err) => {
                tracing::debug!("{}", err);
                false
            }
        }
    }

    /// Closest inclusive ancestor matching selector text
    pub fn closest(&self, id: NodeId, selector: &str) -> Option<NodeId> {
        match SelectorList::parse(selector) {
            Ok(list) => self.closest_matching(id, &list),
            Err(err) => {
                tracing::debug!("{}", err);
                None
            }
        }
    }

    /// Closest inclusive ancestor matching a parsed list
    pub fn closest_matching(&self, id: NodeId, list: &SelectorList) -> Option<NodeId> {
        if !self.is_alive(id) {
            return None;
        }
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&node| list.matches(self, node))
    }

    /// First descendant of `scope` matching selector text
    pub fn query_selector(&self, scope: NodeId, selector: &str) -> Option<NodeId> {
        let list = SelectorList::parse(selector)
            .map_err(|err| tracing::debug!("{}", err))
            .ok()?;
        self.descendants(scope)
            .into_iter()
            .find(|&node| list.matches(self, node))
    }

    /// All descendants of `scope` matching selector text
    pub fn query_selector_all(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        match SelectorList::parse(selector) {
            Ok(list) => self.query_matching(scope, &list),
            Err(err) => {
                tracing::debug!("{}", err);
                Vec::new()
            }
        }
    }

    /// All descendants of `scope` matching a parsed list
    pub fn query_matching(&self, scope: NodeId, list: &SelectorList) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&node| list.matches(self, node))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (DomTree, NodeId, NodeId, NodeId) {
        let mut tree = DomTree::new();
        let section = tree.create_element("section");
        tree.set_attribute(section, "class", "hero locked").unwrap();
        let ul = tree.create_element("ul");
        let li = tree.create_element("li");
        let a = tree.create_element("a");
        tree.set_attribute(a, "href", "https://example.com").unwrap();
        tree.set_attribute(a, "data-role", "cta").unwrap();
        tree.append_child(tree.root(), section).unwrap();
        tree.append_child(section, ul).unwrap();
        tree.append_child(ul, li).unwrap();
        tree.append_child(li, a).unwrap();
        (tree, section, li, a)
    }

    #[test]
    fn test_compound_and_attributes() {
        let (tree, section, _, a) = sample();
        assert!(tree.matches(section, "section.hero.locked"));
        assert!(!tree.matches(section, "section.hero.other"));
        assert!(tree.matches(a, "a[href^=\"https\"]"));
        assert!(tree.matches(a, "[data-role=CTA i]"));
        assert!(!tree.matches(a, "[data-role=CTA]"));
        assert!(tree.matches(a, "*"));
    }

    #[test]
    fn test_combinators() {
        let (tree, _, li, a) = sample();
        assert!(tree.matches(a, ".hero a"));
        assert!(tree.matches(a, "ul > li > a"));
        assert!(!tree.matches(a, "ul > a"));
        assert!(tree.matches(li, "section li"));
    }

    #[test]
    fn test_closest_and_lists() {
        let (tree, section, li, a) = sample();
        assert_eq!(tree.closest(a, "li"), Some(li));
        assert_eq!(tree.closest(a, "a"), Some(a));
        assert_eq!(tree.closest(a, ".nope, .locked"), Some(section));
        assert_eq!(tree.closest(a, "table"), None);
    }

    #[test]
    fn test_query_selector() {
        let (tree, section, _, a) = sample();
        assert_eq!(tree.query_selector(tree.root(), "a"), Some(a));
        assert_eq!(tree.query_selector_all(tree.root(), "section, a"), vec![section, a]);
    }

    #[test]
    fn test_invalid_selectors() {
        assert!(SelectorList::parse("").is_err());
        assert!(SelectorList::parse("div >").is_err());
        assert!(SelectorList::parse("[data-x").is_err());
        assert!(SelectorList::parse("a,,b").is_err());

        let (tree, section, _, _) = sample();
        assert!(!tree.matches(section, "[[["));
        let lossy = SelectorList::parse_lossy(&["[[[", ".hero"]);
        assert_eq!(lossy.len(), 1);
        assert!(lossy.matches(&tree, section));
    }
}

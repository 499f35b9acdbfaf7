//! Formula parsing.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! formula := IDENT '~' sum
//! sum     := product (('+' | '-') product)*
//! product := inter ('*' inter)*
//! inter   := atom (':' atom)*
//! atom    := IDENT | 'C' '(' IDENT ')' | '0' | '1' | '(' sum ')' | '-' atom
//! ```
//!
//! A parsed right-hand side is reduced to a deduplicated list of terms plus
//! an intercept flag. `a * b` expands to `a + b + a:b`; `- 1` and `+ 0`
//! remove the intercept.

use crate::core::error::FormulaError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One variable reference, optionally marked categorical with `C(..)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Factor {
    pub name: String,
    pub explicit_categorical: bool,
}

impl Factor {
    pub fn numeric<S: Into<String>>(name: S) -> Self {
        Factor {
            name: name.into(),
            explicit_categorical: false,
        }
    }

    pub fn categorical<S: Into<String>>(name: S) -> Self {
        Factor {
            name: name.into(),
            explicit_categorical: true,
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.explicit_categorical {
            write!(f, "C({})", self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// A product of factors. The empty term is the intercept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Term {
    pub factors: Vec<Factor>,
}

impl Term {
    pub fn intercept() -> Self {
        Term {
            factors: Vec::new(),
        }
    }

    pub fn degree(&self) -> usize {
        self.factors.len()
    }

    pub fn is_intercept(&self) -> bool {
        self.factors.is_empty()
    }

    fn key(&self) -> Vec<&Factor> {
        let mut key: Vec<&Factor> = self.factors.iter().collect();
        key.sort_by(|a, b| {
            (a.name.as_str(), a.explicit_categorical).cmp(&(b.name.as_str(), b.explicit_categorical))
        });
        key
    }

    /// Union of the factors of both terms, `self` first.
    fn interact(&self, other: &Term) -> Term {
        let mut factors = self.factors.clone();
        for factor in &other.factors {
            if !factors.contains(factor) {
                factors.push(factor.clone());
            }
        }
        Term { factors }
    }
}

/// Terms are equal when they hold the same set of factors.
impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Term {}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_intercept() {
            return write!(f, "Intercept");
        }
        let parts: Vec<String> = self.factors.iter().map(|x| x.to_string()).collect();
        write!(f, "{}", parts.join(":"))
    }
}

/// A parsed model formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedFormula {
    pub response: String,
    pub intercept: bool,
    /// Non-intercept terms, deduplicated, ordered by degree
    pub terms: Vec<Term>,
}

impl ParsedFormula {
    /// All terms including the intercept, in design-column order.
    pub fn all_terms(&self) -> Vec<Term> {
        let mut terms = Vec::with_capacity(self.terms.len() + 1);
        if self.intercept {
            terms.push(Term::intercept());
        }
        terms.extend(self.terms.iter().cloned());
        terms
    }
}

/// The expanded formula: `y ~ a + b + a:b`, with `- 1` when the intercept
/// was removed.
impl fmt::Display for ParsedFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ~ ", self.response)?;
        let terms: Vec<String> = self.terms.iter().map(|t| t.to_string()).collect();
        match (terms.is_empty(), self.intercept) {
            (true, true) => write!(f, "1"),
            (true, false) => write!(f, "0"),
            (false, true) => write!(f, "{}", terms.join(" + ")),
            (false, false) => write!(f, "{} - 1", terms.join(" + ")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Number(String),
    Tilde,
    Plus,
    Minus,
    Star,
    Colon,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(s) | Token::Number(s) => write!(f, "{}", s),
            Token::Tilde => write!(f, "~"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Colon => write!(f, ":"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, FormulaError> {
    let mut tokens = Vec::new();
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut i = 0;

    while i < chars.len() {
        let (pos, c) = chars[i];
        let token = match c {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '~' => Token::Tilde,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            ':' => Token::Colon,
            '(' => Token::LParen,
            ')' => Token::RParen,
            c if c.is_alphabetic() || c == '_' || c == '.' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].1.is_alphanumeric() || chars[i].1 == '_' || chars[i].1 == '.')
                {
                    i += 1;
                }
                let ident: String = chars[start..i].iter().map(|(_, c)| *c).collect();
                tokens.push((Token::Ident(ident), pos));
                continue;
            }
            c if c.is_ascii_digit() => {
                let start = i;
                while i < chars.len() && chars[i].1.is_ascii_digit() {
                    i += 1;
                }
                let number: String = chars[start..i].iter().map(|(_, c)| *c).collect();
                tokens.push((Token::Number(number), pos));
                continue;
            }
            other => {
                return Err(FormulaError::UnexpectedToken {
                    token: other.to_string(),
                    position: pos,
                })
            }
        };
        tokens.push((token, pos));
        i += 1;
    }

    Ok(tokens)
}

/// Terms of a sub-expression with its intercept state.
#[derive(Debug, Clone, Default)]
struct TermSet {
    intercept: bool,
    intercept_removed: bool,
    terms: Vec<Term>,
}

impl TermSet {
    fn single(term: Term) -> Self {
        TermSet {
            terms: vec![term],
            ..Default::default()
        }
    }

    fn push_unique(terms: &mut Vec<Term>, term: Term) {
        if !terms.contains(&term) {
            terms.push(term);
        }
    }

    fn add(mut self, rhs: TermSet) -> TermSet {
        if rhs.intercept {
            self.intercept = true;
            self.intercept_removed = false;
        } else if rhs.intercept_removed {
            self.intercept = false;
            self.intercept_removed = true;
        }
        for term in rhs.terms {
            Self::push_unique(&mut self.terms, term);
        }
        self
    }

    fn subtract(mut self, rhs: TermSet) -> TermSet {
        if rhs.intercept {
            self.intercept = false;
            self.intercept_removed = true;
        } else if rhs.intercept_removed {
            self.intercept = true;
            self.intercept_removed = false;
        }
        self.terms.retain(|t| !rhs.terms.contains(t));
        self
    }

    fn with_intercept_term(&self) -> Vec<Term> {
        let mut terms = Vec::with_capacity(self.terms.len() + 1);
        if self.intercept {
            terms.push(Term::intercept());
        }
        terms.extend(self.terms.iter().cloned());
        terms
    }

    fn interact(self, rhs: TermSet) -> TermSet {
        let mut out = TermSet::default();
        for a in self.with_intercept_term() {
            for b in rhs.with_intercept_term() {
                let term = a.interact(&b);
                if term.is_intercept() {
                    out.intercept = true;
                } else {
                    Self::push_unique(&mut out.terms, term);
                }
            }
        }
        out
    }

    fn product(self, rhs: TermSet) -> TermSet {
        let interaction = self.clone().interact(rhs.clone());
        self.add(rhs).add(interaction)
    }
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn next(&mut self) -> Option<(Token, usize)> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn unexpected(token: Token, position: usize) -> FormulaError {
        FormulaError::UnexpectedToken {
            token: token.to_string(),
            position,
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), FormulaError> {
        match self.next() {
            Some((token, _)) if token == expected => Ok(()),
            Some((token, position)) => Err(Self::unexpected(token, position)),
            None => Err(FormulaError::UnexpectedEnd),
        }
    }

    fn sum(&mut self) -> Result<TermSet, FormulaError> {
        let mut acc = self.product()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    let rhs = self.product()?;
                    acc = acc.add(rhs);
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    let rhs = self.product()?;
                    acc = acc.subtract(rhs);
                }
                _ => return Ok(acc),
            }
        }
    }

    fn product(&mut self) -> Result<TermSet, FormulaError> {
        let mut acc = self.interaction()?;
        while self.peek() == Some(&Token::Star) {
            self.pos += 1;
            let rhs = self.interaction()?;
            acc = acc.product(rhs);
        }
        Ok(acc)
    }

    fn interaction(&mut self) -> Result<TermSet, FormulaError> {
        let mut acc = self.atom()?;
        while self.peek() == Some(&Token::Colon) {
            self.pos += 1;
            let rhs = self.atom()?;
            acc = acc.interact(rhs);
        }
        Ok(acc)
    }

    fn atom(&mut self) -> Result<TermSet, FormulaError> {
        match self.next() {
            None => Err(FormulaError::UnexpectedEnd),
            Some((Token::LParen, _)) => {
                let inner = self.sum()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            // Leading `-`, as in `y ~ -1 + x`.
            Some((Token::Minus, _)) => {
                let rhs = self.atom()?;
                Ok(TermSet::default().subtract(rhs))
            }
            Some((Token::Number(n), position)) => match n.as_str() {
                "1" => Ok(TermSet {
                    intercept: true,
                    ..Default::default()
                }),
                "0" => Ok(TermSet {
                    intercept_removed: true,
                    ..Default::default()
                }),
                _ => Err(Self::unexpected(Token::Number(n), position)),
            },
            Some((Token::Ident(name), _)) if name == "C" && self.peek() == Some(&Token::LParen) => {
                self.pos += 1;
                let inner = match self.next() {
                    Some((Token::Ident(inner), _)) => inner,
                    Some((token, position)) => return Err(Self::unexpected(token, position)),
                    None => return Err(FormulaError::UnexpectedEnd),
                };
                self.expect(Token::RParen)?;
                Ok(TermSet::single(Term {
                    factors: vec![Factor::categorical(inner)],
                }))
            }
            Some((Token::Ident(name), _)) => Ok(TermSet::single(Term {
                factors: vec![Factor::numeric(name)],
            })),
            Some((token, position)) => Err(Self::unexpected(token, position)),
        }
    }
}

/// Parse `response ~ rhs`.
pub fn parse_formula(input: &str) -> Result<ParsedFormula, FormulaError> {
    let (lhs, rhs) = input
        .split_once('~')
        .ok_or_else(|| FormulaError::MissingTilde(input.to_string()))?;

    let response = lhs.trim();
    if response.is_empty() {
        return Err(FormulaError::UnexpectedToken {
            token: "~".to_string(),
            position: lhs.len(),
        });
    }
    if let Some(bad) = response
        .chars()
        .find(|c| !(c.is_alphanumeric() || *c == '_' || *c == '.'))
    {
        return Err(FormulaError::UnexpectedToken {
            token: bad.to_string(),
            position: lhs.find(bad).unwrap_or(0),
        });
    }

    let offset = lhs.len() + 1;
    let tokens = tokenize(rhs)?
        .into_iter()
        .map(|(t, p)| (t, p + offset))
        .collect::<Vec<_>>();

    let mut parser = Parser { tokens, pos: 0 };
    let rhs_terms = parser.sum()?;
    if let Some((token, position)) = parser.next() {
        return Err(Parser::unexpected(token, position));
    }

    // Implicit intercept unless the right-hand side removed it.
    let evaluated = TermSet {
        intercept: true,
        ..Default::default()
    }
    .add(rhs_terms);

    let mut terms = evaluated.terms;
    terms.sort_by_key(Term::degree);

    Ok(ParsedFormula {
        response: response.to_string(),
        intercept: evaluated.intercept,
        terms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::DEFAULT_FORMULA;

    fn names(formula: &ParsedFormula) -> Vec<String> {
        formula.all_terms().iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_simple_formula() {
        let f = parse_formula("y ~ x + C(g)").unwrap();
        assert_eq!(f.response, "y");
        assert!(f.intercept);
        assert_eq!(names(&f), vec!["Intercept", "x", "C(g)"]);
    }

    #[test]
    fn test_star_expands_and_orders_by_degree() {
        let f = parse_formula("y ~ C(a) * C(b) + x").unwrap();
        assert_eq!(names(&f), vec!["Intercept", "C(a)", "C(b)", "x", "C(a):C(b)"]);
        assert_eq!(f.to_string(), "y ~ C(a) + C(b) + x + C(a):C(b)");
    }

    #[test]
    fn test_duplicates_removed() {
        let f = parse_formula(DEFAULT_FORMULA).unwrap();
        let terms = names(&f);
        assert_eq!(
            terms.iter().filter(|t| *t == "C(tipo_residencia)").count(),
            1
        );
        assert_eq!(terms.iter().filter(|t| *t == "C(posse_de_imovel)").count(), 1);
        assert_eq!(terms.last().unwrap(), "C(posse_de_veiculo):C(posse_de_imovel)");
        assert_eq!(terms.len(), 14);
    }

    #[test]
    fn test_intercept_removal() {
        assert!(!parse_formula("y ~ x - 1").unwrap().intercept);
        assert!(!parse_formula("y ~ 0 + x").unwrap().intercept);
        assert!(!parse_formula("y ~ -1 + x").unwrap().intercept);
        assert!(parse_formula("y ~ x - 1 + 1").unwrap().intercept);
    }

    #[test]
    fn test_term_removal_and_interaction_only() {
        let f = parse_formula("y ~ a * b - a").unwrap();
        assert_eq!(names(&f), vec!["Intercept", "b", "a:b"]);

        let f = parse_formula("y ~ a:b").unwrap();
        assert_eq!(names(&f), vec!["Intercept", "a:b"]);
        assert_eq!(
            parse_formula("y ~ a:b").unwrap().terms,
            parse_formula("y ~ b:a").unwrap().terms
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_formula("y x").unwrap_err(),
            FormulaError::MissingTilde("y x".to_string())
        );
        assert_eq!(parse_formula("y ~ x +").unwrap_err(), FormulaError::UnexpectedEnd);
        assert!(matches!(
            parse_formula("y ~ x $ z").unwrap_err(),
            FormulaError::UnexpectedToken { .. }
        ));
        assert!(parse_formula("y ~ C(x").is_err());
        assert!(parse_formula("y ~ 2").is_err());
    }
}

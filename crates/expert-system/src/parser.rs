//! Rule Text Parser
//!
//! Parses s-expression rule definitions:
//!
//! ```text
//! (defrule Gripe
//!   (declare (salience 10))
//!   (numero ?num)
//!   (test (>= ?num 8))
//!   (not (diagnostico ?))
//!   =>
//!   (assert (diagnostico Gripe)))
//! ```
//!
//! Supported conditions: plain patterns, `?f <- (pattern)`, `(not (pattern))`,
//! `(or (pattern) ...)` and `(test (op a b))`. Supported actions:
//! `(assert (template) ...)` and `(retract ?f ...)`.

use crate::fact::{Fact, Value};
use crate::rule::{Action, CmpOp, Comparison, Condition, FactTemplate, FieldPattern, Pattern, Rule, Slot};
use crate::EngineError;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Open,
    Close,
    /// `=>`
    Then,
    /// `<-`
    BindArrow,
    Variable(String),
    Wildcard,
    Number(f64),
    Symbol(String),
    Text(String),
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, EngineError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            ';' => {
                while let Some(&(_, c)) = chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '(' => {
                chars.next();
                tokens.push((Token::Open, pos));
            }
            ')' => {
                chars.next();
                tokens.push((Token::Close, pos));
            }
            '"' => {
                chars.next();
                let mut text = String::new();
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    match c {
                        '"' => {
                            closed = true;
                            break;
                        }
                        '\\' => match chars.next() {
                            Some((_, escaped)) => text.push(escaped),
                            None => break,
                        },
                        c => text.push(c),
                    }
                }
                if !closed {
                    return Err(parse_error(pos, "unterminated string"));
                }
                tokens.push((Token::Text(text), pos));
            }
            _ => {
                let mut atom = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_whitespace() || c == '(' || c == ')' || c == '"' {
                        break;
                    }
                    atom.push(c);
                    chars.next();
                }
                tokens.push((classify_atom(atom), pos));
            }
        }
    }

    Ok(tokens)
}

fn classify_atom(atom: String) -> Token {
    if atom == "=>" {
        return Token::Then;
    }
    if atom == "<-" {
        return Token::BindArrow;
    }
    if atom == "?" {
        return Token::Wildcard;
    }
    if let Some(name) = atom.strip_prefix('?') {
        return Token::Variable(name.to_string());
    }

    let numeric_start = atom
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '+' || c == '.');
    if numeric_start {
        if let Ok(n) = atom.parse::<f64>() {
            if n.is_finite() {
                return Token::Number(n);
            }
        }
    }
    Token::Symbol(atom)
}

fn parse_error(position: usize, message: impl Into<String>) -> EngineError {
    EngineError::Parse {
        position,
        message: message.into(),
    }
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn new(input: &str) -> Result<Self, EngineError> {
        Ok(Self {
            tokens: tokenize(input)?,
            pos: 0,
            end: input.len(),
        })
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).map(|(t, _)| t)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map(|(_, p)| *p).unwrap_or(self.end)
    }

    fn next(&mut self) -> Result<Token, EngineError> {
        let token = self
            .tokens
            .get(self.pos)
            .map(|(t, _)| t.clone())
            .ok_or_else(|| parse_error(self.end, "unexpected end of input"))?;
        self.pos += 1;
        Ok(token)
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<(), EngineError> {
        let at = self.offset();
        let token = self.next()?;
        if token == expected {
            Ok(())
        } else {
            Err(parse_error(at, format!("expected {}, found {:?}", what, token)))
        }
    }

    fn symbol(&mut self, what: &str) -> Result<String, EngineError> {
        let at = self.offset();
        match self.next()? {
            Token::Symbol(s) => Ok(s),
            other => Err(parse_error(at, format!("expected {}, found {:?}", what, other))),
        }
    }

    fn keyword(&mut self, keyword: &str) -> Result<(), EngineError> {
        let at = self.offset();
        let found = self.symbol(keyword)?;
        if found == keyword {
            Ok(())
        } else {
            Err(parse_error(at, format!("expected '{}', found '{}'", keyword, found)))
        }
    }

    /// True when the next tokens are `( keyword`
    fn opens(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Open))
            && matches!(self.peek_at(1), Some(Token::Symbol(s)) if s == keyword)
    }

    fn rule(&mut self) -> Result<Rule, EngineError> {
        self.expect(Token::Open, "'('")?;
        self.keyword("defrule")?;
        let mut rule = Rule::new(self.symbol("rule name")?);

        if let Some(Token::Text(_)) = self.peek() {
            self.next()?;
        }

        if self.opens("declare") {
            rule.salience = self.declare()?;
        }

        while !matches!(self.peek(), Some(Token::Then)) {
            if self.at_end() {
                return Err(parse_error(self.end, "missing '=>' in rule"));
            }
            rule.conditions.push(self.condition()?);
        }
        self.next()?;

        while !matches!(self.peek(), Some(Token::Close)) {
            if self.at_end() {
                return Err(parse_error(self.end, "unclosed rule"));
            }
            rule.actions.extend(self.action()?);
        }
        self.next()?;

        Ok(rule)
    }

    fn declare(&mut self) -> Result<i32, EngineError> {
        self.expect(Token::Open, "'('")?;
        self.keyword("declare")?;
        self.expect(Token::Open, "'('")?;
        self.keyword("salience")?;
        let at = self.offset();
        let salience = match self.next()? {
            Token::Number(n) if n.fract() == 0.0 && n.abs() <= i32::MAX as f64 => n as i32,
            other => return Err(parse_error(at, format!("invalid salience {:?}", other))),
        };
        self.expect(Token::Close, "')'")?;
        self.expect(Token::Close, "')'")?;
        Ok(salience)
    }

    fn condition(&mut self) -> Result<Condition, EngineError> {
        if let Some(Token::Variable(name)) = self.peek() {
            let binding = name.clone();
            self.next()?;
            self.expect(Token::BindArrow, "'<-'")?;
            let pattern = self.pattern()?;
            return Ok(Condition::Match {
                binding: Some(binding),
                pattern,
            });
        }

        if self.opens("not") {
            self.next()?;
            self.next()?;
            let pattern = self.pattern()?;
            self.expect(Token::Close, "')'")?;
            return Ok(Condition::Not(pattern));
        }

        if self.opens("or") {
            self.next()?;
            self.next()?;
            let mut patterns = Vec::new();
            while !matches!(self.peek(), Some(Token::Close)) {
                patterns.push(self.pattern()?);
            }
            self.next()?;
            if patterns.is_empty() {
                return Err(parse_error(self.offset(), "empty 'or'"));
            }
            return Ok(Condition::Any(patterns));
        }

        if self.opens("test") {
            self.next()?;
            self.next()?;
            self.expect(Token::Open, "'('")?;
            let at = self.offset();
            let op_symbol = self.symbol("comparison operator")?;
            let op = CmpOp::from_symbol(&op_symbol)
                .ok_or_else(|| parse_error(at, format!("unknown operator '{}'", op_symbol)))?;
            let lhs = self.slot()?;
            let rhs = self.slot()?;
            self.expect(Token::Close, "')'")?;
            self.expect(Token::Close, "')'")?;
            return Ok(Condition::Test(Comparison { op, lhs, rhs }));
        }

        Ok(Condition::Match {
            binding: None,
            pattern: self.pattern()?,
        })
    }

    fn pattern(&mut self) -> Result<Pattern, EngineError> {
        self.expect(Token::Open, "'('")?;
        let relation = self.symbol("relation name")?;
        let mut fields = Vec::new();
        loop {
            let at = self.offset();
            match self.next()? {
                Token::Close => break,
                Token::Wildcard => fields.push(FieldPattern::Wildcard),
                Token::Variable(name) => fields.push(FieldPattern::Variable(name)),
                Token::Number(n) => fields.push(FieldPattern::Literal(Value::Number(n))),
                Token::Symbol(s) => fields.push(FieldPattern::Literal(Value::Symbol(s))),
                Token::Text(s) => fields.push(FieldPattern::Literal(Value::Text(s))),
                other => return Err(parse_error(at, format!("unexpected {:?} in pattern", other))),
            }
        }
        Ok(Pattern::new(relation, fields))
    }

    fn slot(&mut self) -> Result<Slot, EngineError> {
        let at = self.offset();
        match self.next()? {
            Token::Variable(name) => Ok(Slot::Variable(name)),
            Token::Number(n) => Ok(Slot::Literal(Value::Number(n))),
            Token::Symbol(s) => Ok(Slot::Literal(Value::Symbol(s))),
            Token::Text(s) => Ok(Slot::Literal(Value::Text(s))),
            other => Err(parse_error(at, format!("unexpected {:?}", other))),
        }
    }

    fn template(&mut self) -> Result<FactTemplate, EngineError> {
        self.expect(Token::Open, "'('")?;
        let relation = self.symbol("relation name")?;
        let mut slots = Vec::new();
        while !matches!(self.peek(), Some(Token::Close)) {
            if self.at_end() {
                return Err(parse_error(self.end, "unclosed fact"));
            }
            slots.push(self.slot()?);
        }
        self.next()?;
        Ok(FactTemplate { relation, slots })
    }

    fn action(&mut self) -> Result<Vec<Action>, EngineError> {
        self.expect(Token::Open, "'('")?;
        let at = self.offset();
        let verb = self.symbol("action")?;
        let mut actions = Vec::new();

        match verb.as_str() {
            "assert" => {
                while !matches!(self.peek(), Some(Token::Close)) {
                    if self.at_end() {
                        return Err(parse_error(self.end, "unclosed assert"));
                    }
                    actions.push(Action::Assert(self.template()?));
                }
            }
            "retract" => loop {
                let at = self.offset();
                match self.peek() {
                    Some(Token::Close) => break,
                    Some(Token::Variable(_)) => {
                        if let Token::Variable(name) = self.next()? {
                            actions.push(Action::Retract(name));
                        }
                    }
                    _ => return Err(parse_error(at, "retract expects fact variables")),
                }
            },
            other => return Err(parse_error(at, format!("unknown action '{}'", other))),
        }

        self.next()?;
        if actions.is_empty() {
            return Err(parse_error(at, format!("empty '{}'", verb)));
        }
        Ok(actions)
    }
}

/// Parse a single `defrule`
pub fn parse_rule(input: &str) -> Result<Rule, EngineError> {
    let mut parser = Parser::new(input)?;
    let rule = parser.rule()?;
    if !parser.at_end() {
        return Err(parse_error(parser.offset(), "trailing input after rule"));
    }
    Ok(rule)
}

/// Parse any number of `defrule` definitions
pub fn parse_rules(input: &str) -> Result<Vec<Rule>, EngineError> {
    let mut parser = Parser::new(input)?;
    let mut rules = Vec::new();
    while !parser.at_end() {
        rules.push(parser.rule()?);
    }
    Ok(rules)
}

/// Parse a ground fact such as `(numero 4.5)`
pub fn parse_fact(input: &str) -> Result<Fact, EngineError> {
    let mut parser = Parser::new(input)?;
    let template = parser.template()?;
    if !parser.at_end() {
        return Err(parse_error(parser.offset(), "trailing input after fact"));
    }
    template
        .to_ground_fact()
        .ok_or_else(|| parse_error(0, "facts cannot contain variables"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_rule() {
        let rule = parse_rule(
            "(defrule Gripe
               (declare (salience 10))
               ?f <- (numero ?num)
               (test (>= ?num 8))
               (not (diagnostico ?))
               =>
               (assert (diagnostico Gripe)))",
        )
        .unwrap();

        assert_eq!(rule.name, "Gripe");
        assert_eq!(rule.salience, 10);
        assert_eq!(rule.conditions.len(), 3);
        assert_eq!(
            rule.conditions[0],
            Condition::Match {
                binding: Some("f".into()),
                pattern: Pattern::new("numero", vec![FieldPattern::Variable("num".into())]),
            }
        );
        assert_eq!(
            rule.conditions[1],
            Condition::Test(Comparison {
                op: CmpOp::Ge,
                lhs: Slot::Variable("num".into()),
                rhs: Slot::Literal(Value::Number(8.0)),
            })
        );
        assert_eq!(
            rule.conditions[2],
            Condition::Not(Pattern::new("diagnostico", vec![FieldPattern::Wildcard]))
        );
        assert_eq!(
            rule.actions,
            vec![Action::Assert(FactTemplate {
                relation: "diagnostico".into(),
                slots: vec![Slot::Literal(Value::symbol("Gripe"))],
            })]
        );
    }

    #[test]
    fn test_parse_or_and_string_literal() {
        let rule = parse_rule(
            "(defrule Recomendaciones
               (or (diagnostico Resfriado) (diagnostico Gripe))
               =>
               (assert (recomendacion \"Descansa.\")))",
        )
        .unwrap();

        assert_eq!(rule.salience, 0);
        match &rule.conditions[0] {
            Condition::Any(patterns) => assert_eq!(patterns.len(), 2),
            other => panic!("unexpected condition {:?}", other),
        }
    }

    #[test]
    fn test_parse_multiple_rules_with_comments() {
        let rules = parse_rules(
            "; first
             (defrule a (x) => (assert (y)))
             ; second
             (defrule b ?f <- (y) => (retract ?f))",
        )
        .unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1].actions, vec![Action::Retract("f".into())]);
    }

    #[test]
    fn test_parse_fact() {
        let fact = parse_fact("(numero -2.5)").unwrap();
        assert_eq!(fact, Fact::new("numero", vec![Value::Number(-2.5)]));
        assert!(parse_fact("(numero ?x)").is_err());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_rule("(defrule a (x))"), Err(EngineError::Parse { .. })));
        assert!(matches!(parse_rule("(defrule a (x) => (explode))"), Err(EngineError::Parse { .. })));
        assert!(matches!(parse_rule("(defrule a (test (~ ?x 1)) => (assert (y)))"), Err(EngineError::Parse { .. })));
        assert!(matches!(parse_rule("(defrule a (x \"open) => )"), Err(EngineError::Parse { .. })));
        assert!(matches!(parse_rule("(defrule a (x) => (assert (y))) extra"), Err(EngineError::Parse { .. })));
    }

    #[test]
    fn test_error_position_points_at_token() {
        let err = parse_rule("(defrule a (x) => (explode))").unwrap_err();
        assert_eq!(
            err,
            EngineError::Parse {
                position: 19,
                message: "unknown action 'explode'".into(),
            }
        );
    }

    #[test]
    fn test_printed_rule_parses_back() {
        let text = r#"(defrule mover
            (declare (salience -3))
            ?f <- (pendiente ?x "caja" 4)
            (or (zona ?x) (zona ?))
            (test (>= ?x 1.5))
            (not (bloqueado ?x))
            =>
            (retract ?f)
            (assert (hecho ?x) (nota "dijo \"listo\"")))"#;
        let rule = parse_rule(text).unwrap();
        assert_eq!(parse_rule(&rule.to_string()).unwrap(), rule);
    }
}

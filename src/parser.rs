//! Recursive-descent parser, precedence low to high:
//! `var`-assignment → logic (`&&`/`||`) → comparison (with prefix `!`) →
//! arithmetic (`+`/`-`) → term (`*`/`/`/`%`) → unary `+`/`-` → power
//! (`^`, right-associative) → call → atom.
//!
//! Each block form (`if`, `for`, `while`, `function`) either parses a
//! single trailing statement or, when its `do` is followed by a newline,
//! a full statement sequence up to its closing keyword.

use crate::ast::Node;
use crate::diagnostic::Diagnostic;
use crate::position::Position;
use crate::token::{Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, pos: 0 }
    }

    pub fn parse(mut self) -> Result<Node, Diagnostic> {
        let node = self.parse_statements(&[])?;
        if !self.is_eof() {
            return Err(self.unexpected("end of input"));
        }
        Ok(node)
    }

    // ---- token cursor -----------------------------------------------------

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !matches!(token.kind, TokenKind::Eof) {
            self.pos += 1;
        }
        token
    }

    fn is_eof(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }

    fn is_newline(&self) -> bool {
        matches!(self.current().kind, TokenKind::Newline)
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        self.current().matches_keyword(keyword)
    }

    fn at_terminator(&self, terminators: &[&str]) -> bool {
        terminators.iter().any(|kw| self.is_keyword(kw))
    }

    fn skip_newlines(&mut self) {
        while self.is_newline() {
            self.advance();
        }
    }

    fn unexpected(&self, expected: &str) -> Diagnostic {
        let token = self.current();
        Diagnostic::invalid_syntax(
            format!("Expected {expected}, found '{}'", token.kind),
            token.start.clone(),
            token.end.clone(),
        )
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<Token, Diagnostic> {
        if self.is_keyword(keyword) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&format!("'{keyword}'")))
        }
    }

    fn expect_identifier(&mut self) -> Result<String, Diagnostic> {
        match self.current().kind.clone() {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("an identifier")),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, Diagnostic> {
        if self.current().kind == kind {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&format!("'{kind}'")))
        }
    }

    // ---- statements ---------------------------------------------------

    fn parse_statements(&mut self, terminators: &[&str]) -> Result<Node, Diagnostic> {
        let start = self.current().start.clone();
        self.skip_newlines();
        let mut statements = Vec::new();

        if !self.is_eof() && !self.at_terminator(terminators) {
            statements.push(self.parse_statement()?);
            loop {
                if !self.is_newline() {
                    break;
                }
                self.skip_newlines();
                if self.is_eof() || self.at_terminator(terminators) {
                    break;
                }
                statements.push(self.parse_statement()?);
            }
        }

        let end = self.current().start.clone();
        Ok(Node::Statements { statements, start, end })
    }

    fn parse_statement(&mut self) -> Result<Node, Diagnostic> {
        if self.is_keyword("return") {
            let token = self.advance();
            if self.is_newline() || self.is_eof() || self.at_terminator(&["end", "elseif", "else"]) {
                return Ok(Node::Return {
                    value: None,
                    start: token.start,
                    end: token.end,
                });
            }
            let value = self.parse_expression()?;
            let end = value.end().clone();
            return Ok(Node::Return {
                value: Some(Box::new(value)),
                start: token.start,
                end,
            });
        }
        if self.is_keyword("continue") {
            let token = self.advance();
            return Ok(Node::Continue { start: token.start, end: token.end });
        }
        if self.is_keyword("break") {
            let token = self.advance();
            return Ok(Node::Break { start: token.start, end: token.end });
        }
        self.parse_expression()
    }

    // ---- expressions, precedence low to high ---------------------------

    fn parse_expression(&mut self) -> Result<Node, Diagnostic> {
        if self.is_keyword("var") {
            let start = self.current().start.clone();
            self.advance();
            let name = self.expect_identifier()?;
            self.expect(TokenKind::Equals)?;
            let value = self.parse_expression()?;
            let end = value.end().clone();
            return Ok(Node::VarAssign { name, value: Box::new(value), start, end });
        }
        self.parse_logic()
    }

    fn parse_logic(&mut self) -> Result<Node, Diagnostic> {
        let mut left = self.parse_comparison()?;
        while matches!(self.current().kind, TokenKind::And | TokenKind::Or) {
            let op = self.advance().kind;
            let right = self.parse_comparison()?;
            left = Self::binop(op, left, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Node, Diagnostic> {
        if matches!(self.current().kind, TokenKind::Not) {
            let token = self.advance();
            let operand = self.parse_comparison()?;
            let end = operand.end().clone();
            return Ok(Node::UnaryOp {
                op: TokenKind::Not,
                operand: Box::new(operand),
                start: token.start,
                end,
            });
        }
        let mut left = self.parse_arith()?;
        while matches!(
            self.current().kind,
            TokenKind::EqualsEquals
                | TokenKind::NotEquals
                | TokenKind::LessThan
                | TokenKind::GreaterThan
                | TokenKind::LessEquals
                | TokenKind::GreaterEquals
        ) {
            let op = self.advance().kind;
            let right = self.parse_arith()?;
            left = Self::binop(op, left, right);
        }
        Ok(left)
    }

    fn parse_arith(&mut self) -> Result<Node, Diagnostic> {
        let mut left = self.parse_term()?;
        while matches!(self.current().kind, TokenKind::Plus | TokenKind::Minus) {
            let op = self.advance().kind;
            let right = self.parse_term()?;
            left = Self::binop(op, left, right);
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Node, Diagnostic> {
        let mut left = self.parse_factor()?;
        while matches!(self.current().kind, TokenKind::Star | TokenKind::Slash | TokenKind::Percent) {
            let op = self.advance().kind;
            let right = self.parse_factor()?;
            left = Self::binop(op, left, right);
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<Node, Diagnostic> {
        if matches!(self.current().kind, TokenKind::Plus | TokenKind::Minus) {
            let token = self.advance();
            let op = token.kind.clone();
            let operand = self.parse_factor()?;
            let end = operand.end().clone();
            return Ok(Node::UnaryOp { op, operand: Box::new(operand), start: token.start, end });
        }
        self.parse_power()
    }

    /// Right-associative: the right side recurses through `factor` (which
    /// bottoms out back in `power`), so it greedily swallows any further
    /// `^` chain before this loop gets a chance to iterate again.
    fn parse_power(&mut self) -> Result<Node, Diagnostic> {
        let mut left = self.parse_call()?;
        while matches!(self.current().kind, TokenKind::Pow) {
            self.advance();
            let right = self.parse_factor()?;
            left = Self::binop(TokenKind::Pow, left, right);
        }
        Ok(left)
    }

    fn parse_call(&mut self) -> Result<Node, Diagnostic> {
        let callee = self.parse_atom()?;
        if matches!(self.current().kind, TokenKind::LParen) {
            let start = callee.start().clone();
            self.advance();
            let mut args = Vec::new();
            if !matches!(self.current().kind, TokenKind::RParen) {
                args.push(self.parse_expression()?);
                while matches!(self.current().kind, TokenKind::Comma) {
                    self.advance();
                    args.push(self.parse_expression()?);
                }
            }
            let close = self.expect(TokenKind::RParen)?;
            return Ok(Node::Call { callee: Box::new(callee), args, start, end: close.end });
        }
        Ok(callee)
    }

    fn parse_atom(&mut self) -> Result<Node, Diagnostic> {
        let token = self.current().clone();
        match &token.kind {
            TokenKind::Number(value) => {
                self.advance();
                Ok(Node::Number { value: *value, start: token.start, end: token.end })
            }
            TokenKind::String(value) => {
                self.advance();
                Ok(Node::Str { value: value.clone(), start: token.start, end: token.end })
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(Node::VarAccess { name: name.clone(), start: token.start, end: token.end })
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::LBracket => self.parse_list(),
            TokenKind::Keyword(keyword) if keyword == "if" => self.parse_if(),
            TokenKind::Keyword(keyword) if keyword == "for" => self.parse_for(),
            TokenKind::Keyword(keyword) if keyword == "while" => self.parse_while(),
            TokenKind::Keyword(keyword) if keyword == "function" => self.parse_function(),
            _ => Err(self.unexpected("a value")),
        }
    }

    fn parse_list(&mut self) -> Result<Node, Diagnostic> {
        let start = self.current().start.clone();
        self.advance();
        let mut items = Vec::new();
        if !matches!(self.current().kind, TokenKind::RBracket) {
            items.push(self.parse_expression()?);
            while matches!(self.current().kind, TokenKind::Comma) {
                self.advance();
                items.push(self.parse_expression()?);
            }
        }
        let close = self.expect(TokenKind::RBracket)?;
        Ok(Node::List { items, start, end: close.end })
    }

    /// Parses the trailing block of an `if`/`for`/`while`/`function`: a
    /// single statement when `do` is immediately followed by content on
    /// the same line, or a whole statement sequence when it's followed by
    /// a newline.
    fn parse_block_body(&mut self, terminators: &[&str]) -> Result<Node, Diagnostic> {
        if self.is_newline() {
            self.parse_statements(terminators)
        } else {
            self.parse_statement()
        }
    }

    fn parse_if(&mut self) -> Result<Node, Diagnostic> {
        let start = self.current().start.clone();
        let (cases, else_case, end) = self.parse_if_tail("if")?;
        Ok(Node::If { cases, else_case, start, end })
    }

    fn parse_if_tail(
        &mut self,
        keyword: &str,
    ) -> Result<(Vec<(Node, Node)>, Option<Box<Node>>, Position), Diagnostic> {
        self.expect_keyword(keyword)?;
        let condition = self.parse_expression()?;
        self.expect_keyword("do")?;
        let body = self.parse_block_body(&["elseif", "else", "end"])?;
        let mut cases = vec![(condition, body)];

        if self.is_keyword("elseif") {
            let (more_cases, else_case, end) = self.parse_if_tail("elseif")?;
            cases.extend(more_cases);
            Ok((cases, else_case, end))
        } else if self.is_keyword("else") {
            self.advance();
            let else_body = self.parse_block_body(&["end"])?;
            let end_token = self.expect_keyword("end")?;
            Ok((cases, Some(Box::new(else_body)), end_token.end))
        } else {
            let end_token = self.expect_keyword("end")?;
            Ok((cases, None, end_token.end))
        }
    }

    fn parse_for(&mut self) -> Result<Node, Diagnostic> {
        let start = self.current().start.clone();
        self.expect_keyword("for")?;
        let var_name = self.expect_identifier()?;
        self.expect_keyword("from")?;
        let start_value = self.parse_expression()?;
        self.expect_keyword("to")?;
        let end_value = self.parse_expression()?;
        let step_value = if self.is_keyword("step") {
            self.advance();
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };
        self.expect_keyword("do")?;
        let body = self.parse_block_body(&["end"])?;
        let end_token = self.expect_keyword("end")?;
        Ok(Node::For {
            var_name,
            start_value: Box::new(start_value),
            end_value: Box::new(end_value),
            step_value,
            body: Box::new(body),
            start,
            end: end_token.end,
        })
    }

    fn parse_while(&mut self) -> Result<Node, Diagnostic> {
        let start = self.current().start.clone();
        self.expect_keyword("while")?;
        let condition = self.parse_expression()?;
        self.expect_keyword("do")?;
        let body = self.parse_block_body(&["end"])?;
        let end_token = self.expect_keyword("end")?;
        Ok(Node::While { condition: Box::new(condition), body: Box::new(body), start, end: end_token.end })
    }

    fn parse_function(&mut self) -> Result<Node, Diagnostic> {
        let start = self.current().start.clone();
        self.expect_keyword("function")?;
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !matches!(self.current().kind, TokenKind::RParen) {
            params.push(self.expect_identifier()?);
            while matches!(self.current().kind, TokenKind::Comma) {
                self.advance();
                params.push(self.expect_identifier()?);
            }
        }
        self.expect(TokenKind::RParen)?;
        self.expect_keyword("do")?;
        let body = self.parse_block_body(&["end"])?;
        let end_token = self.expect_keyword("end")?;
        Ok(Node::FuncDef { name: None, params, body: Box::new(body), start, end: end_token.end })
    }

    fn binop(op: TokenKind, left: Node, right: Node) -> Node {
        let start = left.start().clone();
        let end = right.end().clone();
        Node::BinOp { op, left: Box::new(left), right: Box::new(right), start, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(src: &str) -> Result<Node, Diagnostic> {
        let tokens = Lexer::new("<test>", src).make_tokens().unwrap();
        Parser::new(tokens).parse()
    }

    #[test]
    fn parses_arithmetic_precedence() {
        let ast = parse("1 + 2 * 3").unwrap();
        match ast {
            Node::Statements { statements, .. } => assert_eq!(statements.len(), 1),
            _ => panic!("expected statements"),
        }
    }

    #[test]
    fn power_is_right_associative() {
        let ast = parse("2 ^ 3 ^ 2").unwrap();
        let Node::Statements { statements, .. } = ast else { panic!("expected statements") };
        match &statements[0] {
            Node::BinOp { op: TokenKind::Pow, right, .. } => {
                assert!(matches!(**right, Node::BinOp { op: TokenKind::Pow, .. }));
            }
            other => panic!("expected a pow binop, got {other:?}"),
        }
    }

    #[test]
    fn bare_return_has_no_value() {
        let ast = parse("function () do return end").unwrap();
        let Node::Statements { statements, .. } = ast else { panic!("expected statements") };
        let Node::FuncDef { body, .. } = &statements[0] else { panic!("expected funcdef") };
        let Node::Statements { statements: body_stmts, .. } = &**body else { panic!("expected block") };
        assert!(matches!(body_stmts[0], Node::Return { value: None, .. }));
    }

    #[test]
    fn if_elseif_else_chain() {
        let ast = parse("if 1 do 1 elseif 2 do 2 else 3 end").unwrap();
        let Node::Statements { statements, .. } = ast else { panic!("expected statements") };
        match &statements[0] {
            Node::If { cases, else_case, .. } => {
                assert_eq!(cases.len(), 2);
                assert!(else_case.is_some());
            }
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn missing_end_is_a_syntax_error() {
        assert!(parse("if 1 do 1").is_err());
    }

    #[test]
    fn list_literal_and_indexing_call_chain() {
        let ast = parse("[1, 2, 3]").unwrap();
        let Node::Statements { statements, .. } = ast else { panic!("expected statements") };
        assert!(matches!(statements[0], Node::List { .. }));
    }

    #[test]
    fn multiline_statements_are_newline_separated() {
        let ast = parse("var x = 1\nvar y = 2\nx + y").unwrap();
        let Node::Statements { statements, .. } = ast else { panic!("expected statements") };
        assert_eq!(statements.len(), 3);
    }
}

use std::sync::Arc;

use crate::error::Error;
use crate::registry::{Host, Registry};
use crate::runtime::value::Value;
use crate::syntax::lexer::Lexer;
use crate::syntax::token::{SourceLocation, Token, TokenKind};

/// Walks a script in a single pass, dispatching against the host as it
/// parses. Tokens are pulled from the lexer on demand, so every command
/// before a malformed stretch of input still runs.
pub struct Evaluator<'a, H: Host> {
    lexer: Lexer<'a>,
    // pulled but unconsumed tokens; `peeked` is only ever filled behind `pending`
    pending: Option<Token>,
    peeked: Option<Token>,
    host: &'a mut H,
    registry: Arc<Registry<H>>,
}

impl<'a, H: Host> Evaluator<'a, H> {
    pub fn new(
        source: &'a str,
        source_name: &str,
        host: &'a mut H,
        registry: Arc<Registry<H>>,
    ) -> Self {
        Self {
            lexer: Lexer::new(source, source_name),
            pending: None,
            peeked: None,
            host,
            registry,
        }
    }

    /// Evaluates value constructs until the input ends, discarding each
    /// result.
    pub fn run(&mut self) -> Result<(), Error> {
        while !self.is_at_end()? {
            self.value()?;
        }
        Ok(())
    }

    // ─── Grammar ─────────────────────────────────────────────────────────────

    fn value(&mut self) -> Result<Value, Error> {
        let token = self.advance()?;
        match token.kind {
            TokenKind::Int(v) => Ok(Value::Int(v)),
            TokenKind::Float(v) => Ok(Value::Float(v)),
            TokenKind::Str(s) => Ok(Value::Str(s)),
            TokenKind::Null => Ok(Value::Null),
            TokenKind::OpenList => self.list(),
            TokenKind::Ident(name) => self.ident(name, token.location),
            other => Err(Error::syntax(&token.location, format!("Invalid value {other}"))),
        }
    }

    /// An identifier is a call, a property assignment, or a bare word,
    /// decided by the token that follows it.
    fn ident(&mut self, name: String, loc: SourceLocation) -> Result<Value, Error> {
        if self.check(TokenKind::OpenCall)? {
            self.call(name, loc)
        } else if self.check(TokenKind::PropSet)? {
            self.property_assignment(name, loc)
        } else {
            Ok(Value::Word(name))
        }
    }

    fn call(&mut self, name: String, loc: SourceLocation) -> Result<Value, Error> {
        self.expect(TokenKind::OpenCall)?;

        // `name =` right after the parenthesis selects the named form
        let named = matches!(self.peek_kind()?, TokenKind::Ident(_))
            && self.peek_next_is(TokenKind::Equals)?;

        // arguments evaluate before the command name resolves
        let registry = self.registry.clone();
        if named {
            let args = self.named_arguments()?;
            let Some(command) = registry.find_command(&name) else {
                return Err(Error::resolution(&loc, format!("Command '{name}' not found")));
            };
            command.invoke_named(self.host, args, &loc)
        } else {
            let args = self.positional_arguments()?;
            let Some(command) = registry.find_command(&name) else {
                return Err(Error::resolution(&loc, format!("Command '{name}' not found")));
            };
            command.invoke(self.host, args, &loc)
        }
    }

    fn positional_arguments(&mut self) -> Result<Vec<(Value, SourceLocation)>, Error> {
        let mut args = Vec::new();
        if !self.check(TokenKind::CloseCall)? {
            loop {
                let loc = self.location()?;
                let value = self.value()?;
                args.push((value, loc));
                if !self.matches(TokenKind::Comma)? {
                    break;
                }
            }
        }
        self.expect(TokenKind::CloseCall)?;
        Ok(args)
    }

    fn named_arguments(&mut self) -> Result<Vec<(String, Value, SourceLocation)>, Error> {
        let mut args = Vec::new();
        loop {
            let token = self.advance()?;
            let name = match token.kind {
                TokenKind::Ident(name) => name,
                other => {
                    return Err(Error::syntax(
                        &token.location,
                        format!("Expected parameter name, got {other}"),
                    ));
                }
            };
            self.expect(TokenKind::Equals)?;
            let value = self.value()?;
            args.push((name, value, token.location));
            if !self.matches(TokenKind::Comma)? {
                break;
            }
        }
        self.expect(TokenKind::CloseCall)?;
        Ok(args)
    }

    fn list(&mut self) -> Result<Value, Error> {
        let mut items = Vec::new();
        if !self.check(TokenKind::CloseList)? {
            loop {
                let loc = self.location()?;
                let value = self.value()?;
                if value.is_void() {
                    return Err(Error::coercion(&loc, "Cannot access a void value."));
                }
                items.push(value);
                if !self.matches(TokenKind::Comma)? {
                    break;
                }
            }
        }
        self.expect(TokenKind::CloseList)?;
        Ok(Value::List(items))
    }

    /// `Name := value`. The value side runs first; an unknown property
    /// is reported only after its effects have happened.
    fn property_assignment(&mut self, name: String, loc: SourceLocation) -> Result<Value, Error> {
        self.expect(TokenKind::PropSet)?;
        let value = self.value()?;

        let registry = self.registry.clone();
        let Some(property) = registry.find_property(&name) else {
            return Err(Error::resolution(&loc, format!("Property '{name}' not found")));
        };
        property.set(self.host, value, &loc)?;
        Ok(Value::Void)
    }

    // ─── Token primitives ────────────────────────────────────────────────────

    fn peek_kind(&mut self) -> Result<TokenKind, Error> {
        match &self.pending {
            Some(token) => Ok(token.kind.clone()),
            None => {
                let token = self.lexer.next_token()?;
                let kind = token.kind.clone();
                self.pending = Some(token);
                Ok(kind)
            }
        }
    }

    fn peek_next_is(&mut self, kind: TokenKind) -> Result<bool, Error> {
        if self.pending.is_none() {
            self.pending = Some(self.lexer.next_token()?);
        }
        if self.peeked.is_none() {
            self.peeked = Some(self.lexer.next_token()?);
        }
        Ok(matches!(&self.peeked, Some(token) if token.kind == kind))
    }

    fn advance(&mut self) -> Result<Token, Error> {
        match self.pending.take() {
            Some(token) => {
                self.pending = self.peeked.take();
                Ok(token)
            }
            None => self.lexer.next_token(),
        }
    }

    fn check(&mut self, kind: TokenKind) -> Result<bool, Error> {
        Ok(self.peek_kind()? == kind)
    }

    fn matches(&mut self, kind: TokenKind) -> Result<bool, Error> {
        if self.check(kind)? {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, Error> {
        let token = self.advance()?;
        if token.kind == kind {
            Ok(token)
        } else {
            Err(Error::syntax(
                &token.location,
                format!("Expected {kind}, got {}", token.kind),
            ))
        }
    }

    fn is_at_end(&mut self) -> Result<bool, Error> {
        self.check(TokenKind::Eof)
    }

    /// Location of the next unconsumed token.
    fn location(&mut self) -> Result<SourceLocation, Error> {
        match &self.pending {
            Some(token) => Ok(token.location.clone()),
            None => {
                let token = self.lexer.next_token()?;
                let location = token.location.clone();
                self.pending = Some(token);
                Ok(location)
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Declarations, Param};
    use crate::types::descriptor::TypeDesc;

    #[derive(Default)]
    struct Probe {
        log: Vec<String>,
        x: i64,
    }

    impl Host for Probe {
        fn declare(decl: &mut Declarations<Self>) {
            decl.command("Two", &[], |_, _| Ok(Value::Int(2)));
            decl.command(
                "Sum",
                &[Param::new("a", TypeDesc::Int), Param::new("b", TypeDesc::Int)],
                |_, args| Ok(Value::Int(args[0].as_int().unwrap() + args[1].as_int().unwrap())),
            );
            decl.void_command("Note", &[Param::new("msg", TypeDesc::Str)], |host, args| {
                host.log.push(args[0].as_str().unwrap().to_string());
                Ok(())
            });
            decl.property("X", TypeDesc::Int, |host, value| {
                host.x = value.as_int().unwrap();
                Ok(())
            });
        }
    }

    fn eval(src: &str) -> Probe {
        let mut host = Probe::default();
        crate::evaluate(&mut host, src).unwrap();
        host
    }

    fn eval_err(src: &str) -> (Probe, Error) {
        let mut host = Probe::default();
        let err = crate::evaluate(&mut host, src).unwrap_err();
        (host, err)
    }

    #[test]
    fn top_level_discards_values() {
        let host = eval("1 \"two\" {3, word} ! Two()");
        assert_eq!(host.x, 0);
    }

    #[test]
    fn zero_argument_call_is_consumed() {
        let host = eval("X := Two() X := Sum(Two(), 3)");
        assert_eq!(host.x, 5);
    }

    #[test]
    fn calls_nest_in_any_argument_position() {
        assert_eq!(eval("X := Sum(Two(), 1)").x, 3);
        assert_eq!(eval("X := Sum(1, Two())").x, 3);
        assert_eq!(eval("X := Sum(a = Two(), b = Two())").x, 4);
    }

    #[test]
    fn bare_words_reach_string_parameters() {
        let host = eval("Note(msg = hi)");
        assert_eq!(host.log, vec!["hi"]);
    }

    #[test]
    fn property_value_runs_before_resolution() {
        let (host, err) = eval_err("Missing := Note(msg = ran)");
        assert!(err.to_string().contains("Property 'Missing' not found"), "{err}");
        assert_eq!(host.log, vec!["ran"]);
    }

    #[test]
    fn arguments_run_before_command_resolution() {
        let (host, err) = eval_err("Missing(Note(msg = ran), X := 9, 1)");
        assert!(err.to_string().contains("Command 'Missing' not found"), "{err}");
        assert_eq!(host.log, vec!["ran"]);
        assert_eq!(host.x, 9);
    }

    #[test]
    fn effects_before_a_lex_error_still_happen() {
        let (host, err) = eval_err("Note(msg = early) @");
        assert!(err.to_string().contains("Unrecognized character '@'"), "{err}");
        assert_eq!(host.log, vec!["early"]);

        let (host, err) = eval_err("X := 5 @");
        assert!(err.to_string().contains("Unrecognized character '@'"), "{err}");
        assert_eq!(host.x, 5);
    }

    #[test]
    fn unterminated_call() {
        let (_, err) = eval_err("Sum(1, 2");
        assert!(err.to_string().contains("Expected ')', got end of input"), "{err}");
    }

    #[test]
    fn named_arguments_do_not_mix_with_positional() {
        let (_, err) = eval_err("Sum(a = 1, 2)");
        assert!(err.to_string().contains("Expected parameter name, got '2'"), "{err}");
    }

    #[test]
    fn trailing_commas_are_rejected() {
        let (_, err) = eval_err("Sum(1, 2,)");
        assert!(err.to_string().contains("Invalid value ')'"), "{err}");
        let (_, err) = eval_err("X := Sum(1, {2,})");
        assert!(err.to_string().contains("Invalid value '}'"), "{err}");
    }

    #[test]
    fn void_results_cannot_join_lists() {
        let (_, err) = eval_err("{1, Note(msg = no)}");
        assert!(err.to_string().contains("Cannot access a void value."), "{err}");
    }

    #[test]
    fn assignment_yields_no_value() {
        let (host, err) = eval_err("Sum(X := 1, 2)");
        assert!(
            err.to_string()
                .contains("Error in parsing parameter 'a' for command 'Sum': Cannot access a void value."),
            "{err}"
        );
        assert_eq!(host.x, 1);
    }
}

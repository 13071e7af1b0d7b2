use mimic_lexer::{Lexer, Token};

#[test]
fn simple_assignment_test() {
    let mut lexer = Lexer::new("Foo = Origin mimic");

    assert_eq!(lexer.next(), Some(Token::Identifier(String::from("Foo"))));
    assert_eq!(lexer.next(), Some(Token::Whitespace));
    assert_eq!(lexer.next(), Some(Token::Assign));
    assert_eq!(lexer.next(), Some(Token::Whitespace));
    assert_eq!(
        lexer.next(),
        Some(Token::Identifier(String::from("Origin")))
    );
    assert_eq!(lexer.next(), Some(Token::Whitespace));
    assert_eq!(lexer.next(), Some(Token::Identifier(String::from("mimic"))));
    assert_eq!(lexer.next(), None);
}

#[test]
fn operator_test() {
    let mut lexer = Lexer::new("1 <=> 2").skip_whitespace(true);

    assert_eq!(lexer.next(), Some(Token::LitInteger(String::from("1"))));
    assert_eq!(lexer.next(), Some(Token::Operator(String::from("<=>"))));
    assert_eq!(lexer.next(), Some(Token::LitInteger(String::from("2"))));
    assert_eq!(lexer.next(), None);
}

#[test]
fn equality_is_not_assignment_test() {
    let mut lexer = Lexer::new("a == b").skip_whitespace(true);

    assert_eq!(lexer.next(), Some(Token::Identifier(String::from("a"))));
    assert_eq!(lexer.next(), Some(Token::Operator(String::from("=="))));
    assert_eq!(lexer.next(), Some(Token::Identifier(String::from("b"))));
    assert_eq!(lexer.next(), None);
}

#[test]
fn keyword_identifier_test() {
    let mut lexer = Lexer::new("foo(bar: 42)").skip_whitespace(true);

    assert_eq!(lexer.next(), Some(Token::Identifier(String::from("foo"))));
    assert_eq!(lexer.next(), Some(Token::NewArgs));
    let keyword = lexer.next().unwrap();
    assert!(keyword.is_keyword());
    assert_eq!(keyword, Token::Identifier(String::from("bar:")));
    assert_eq!(lexer.next(), Some(Token::LitInteger(String::from("42"))));
    assert_eq!(lexer.next(), Some(Token::EndArgs));
    assert_eq!(lexer.next(), None);
}

#[test]
fn symbol_literal_test() {
    let mut lexer = Lexer::new(":useValue").skip_whitespace(true);

    assert_eq!(lexer.next(), Some(Token::LitSymbol(String::from("useValue"))));
    assert_eq!(lexer.next(), None);
}

#[test]
fn string_literal_test() {
    let mut lexer = Lexer::new("\"some \\\"quoted\\\" string\"");

    assert_eq!(
        lexer.next(),
        Some(Token::LitString(String::from("some \"quoted\" string")))
    );
    assert_eq!(lexer.next(), None);
}

#[test]
fn comment_and_newline_test() {
    let mut lexer = Lexer::new("a ; trailing words\nb")
        .skip_whitespace(true)
        .skip_comments(true);

    assert_eq!(lexer.next(), Some(Token::Identifier(String::from("a"))));
    assert_eq!(lexer.next(), Some(Token::Newline));
    assert_eq!(lexer.next(), Some(Token::Identifier(String::from("b"))));
    assert_eq!(lexer.next(), None);
}

#[test]
fn position_tracking_test() {
    let mut lexer = Lexer::new("ab\n  cd").skip_whitespace(true);

    lexer.next();
    assert_eq!(lexer.token_position(), (1, 1));
    lexer.next(); // newline
    lexer.next();
    assert_eq!(lexer.token_position(), (2, 3));
}

#[test]
fn mutation_bang_identifier_test() {
    let mut lexer = Lexer::new("removeCell!(\"x\")").skip_whitespace(true);

    assert_eq!(
        lexer.next(),
        Some(Token::Identifier(String::from("removeCell!")))
    );
    assert_eq!(lexer.next(), Some(Token::NewArgs));
    assert_eq!(lexer.next(), Some(Token::LitString(String::from("x"))));
    assert_eq!(lexer.next(), Some(Token::EndArgs));
    assert_eq!(lexer.next(), None);
}

//! The Thorn grammar
//!
//! Statements end in `;`, except that the last statement of a block or file
//! may omit it. A `{` at statement start opens a block; dictionaries appear
//! wherever an expression is expected. Operator precedence, loosest first:
//! lambda, assignment, `??`, `||`/`or`, `&&`/`and`, equality, comparison,
//! `+ -`, `* / %`, `**`, unary `! -`, then call/member/index.

use once_cell::sync::Lazy;

use super::{Assoc, Grammar, GrammarBuilder, field};
use crate::language::Language;
use crate::parser::SyntaxKind::{self, *};
use crate::rhs;
use crate::table::ParseTable;

/// Terminals recovery tries first when it has to insert a missing token
const INSERTION_ORDER: &[SyntaxKind] = &[
    SEMICOLON,
    R_PAREN,
    R_BRACKET,
    R_BRACE,
    STRING_END,
    INTERPOLATION_END,
    COMMA,
    COLON,
    FAT_ARROW,
    IDENT,
];

const BINARY_OPERATORS: &[SyntaxKind] = &[
    QUESTION_QUESTION,
    PIPE_PIPE,
    OR_KW,
    AMP_AMP,
    AND_KW,
    EQ_EQ,
    BANG_EQ,
    LT,
    LT_EQ,
    GT,
    GT_EQ,
    PLUS,
    MINUS,
    STAR,
    SLASH,
    PERCENT,
    STAR_STAR,
];

const ASSIGNMENT_OPERATORS: &[SyntaxKind] = &[EQ, PLUS_EQ, MINUS_EQ, STAR_EQ, SLASH_EQ, PERCENT_EQ];

const TYPE_KEYWORDS: &[SyntaxKind] = &[
    STRING_TYPE_KW,
    NUMBER_TYPE_KW,
    BOOLEAN_TYPE_KW,
    ANY_TYPE_KW,
    VOID_TYPE_KW,
    FUNCTION_TYPE_KW,
    DICT_TYPE_KW,
    ARRAY_TYPE_KW,
    NULL_KW,
    IDENT,
];

/// The Thorn language, built once per process
pub fn language() -> &'static Language {
    static THORN: Lazy<Language> = Lazy::new(|| {
        let grammar = grammar().expect("the Thorn grammar is well-formed");
        Language::new("thorn", ParseTable::build(&grammar))
    });
    &THORN
}

pub fn grammar() -> crate::Result<Grammar> {
    let mut g = GrammarBuilder::new("thorn");
    g.terminals(INSERTION_ORDER);

    // =========================================================================
    // PRECEDENCE (lowest first)
    // =========================================================================
    let if_without_else = g.precedence(Assoc::NonAssoc, &[]);
    g.precedence(Assoc::NonAssoc, &[ELSE_KW]);
    let empty_block = g.precedence(Assoc::NonAssoc, &[]);
    let lambda_prec = g.precedence(Assoc::Right, &[]);
    g.precedence(Assoc::Right, ASSIGNMENT_OPERATORS);
    g.precedence(Assoc::Left, &[QUESTION_QUESTION]);
    g.precedence(Assoc::Left, &[PIPE_PIPE, OR_KW]);
    g.precedence(Assoc::Left, &[AMP_AMP, AND_KW]);
    g.precedence(Assoc::Left, &[EQ_EQ, BANG_EQ]);
    g.precedence(Assoc::Left, &[LT, LT_EQ, GT, GT_EQ]);
    g.precedence(Assoc::Left, &[PLUS, MINUS]);
    g.precedence(Assoc::Left, &[STAR, SLASH, PERCENT]);
    g.precedence(Assoc::Right, &[STAR_STAR]);
    let unary = g.precedence(Assoc::Right, &[]);
    g.precedence(Assoc::Left, &[L_PAREN, L_BRACKET, DOT]);

    // =========================================================================
    // SYMBOLS
    // =========================================================================
    let source_file = g.hidden("_source_file");
    let stmts = g.hidden("_stmts");
    let stmt_list = g.hidden("_stmt_list");
    let stmt = g.hidden("_stmt");
    let last_stmt = g.hidden("_last_stmt");
    let binding = g.hidden("_binding");
    let exportable = g.hidden("_exportable");
    let names = g.hidden("_names");
    let for_init = g.hidden("_for_init");
    let opt_expr = g.hidden("_opt_expr");
    let params = g.hidden("_params");
    let methods = g.hidden("_methods");
    let expr = g.hidden("_expr");
    let elements = g.hidden("_elements");
    let entries = g.hidden("_entries");
    let arms = g.hidden("_arms");
    let string_part = g.hidden("_string_part");
    let string_parts = g.hidden("_string_parts");

    let let_declaration = g.visible("let_declaration", LET_DECLARATION);
    let immut_declaration = g.visible("immut_declaration", IMMUT_DECLARATION);
    let expression_statement = g.visible("expression_statement", EXPRESSION_STATEMENT);
    let return_statement = g.visible("return_statement", RETURN_STATEMENT);
    let throw_statement = g.visible("throw_statement", THROW_STATEMENT);
    let import_statement = g.visible("import_statement", IMPORT_STATEMENT);
    let import_clause = g.visible("import_clause", IMPORT_CLAUSE);
    let export_statement = g.visible("export_statement", EXPORT_STATEMENT);
    let if_statement = g.visible("if_statement", IF_STATEMENT);
    let while_statement = g.visible("while_statement", WHILE_STATEMENT);
    let for_statement = g.visible("for_statement", FOR_STATEMENT);
    let for_in_statement = g.visible("for_in_statement", FOR_IN_STATEMENT);
    let block = g.visible("block", BLOCK);
    let try_statement = g.visible("try_statement", TRY_STATEMENT);
    let catch_clause = g.visible("catch_clause", CATCH_CLAUSE);
    let function_declaration = g.visible("function_declaration", FUNCTION_DECLARATION);
    let class_declaration = g.visible("class_declaration", CLASS_DECLARATION);
    let class_body = g.visible("class_body", CLASS_BODY);
    let parameter_list = g.visible("parameter_list", PARAMETER_LIST);
    let parameter = g.visible("parameter", PARAMETER);
    let type_annotation = g.visible("type_annotation", TYPE_ANNOTATION);
    let type_ = g.visible("type", TYPE);
    let argument_list = g.visible("argument_list", ARGUMENT_LIST);
    let lambda = g.visible("lambda_expression", LAMBDA_EXPRESSION);
    let match_expression = g.visible("match_expression", MATCH_EXPRESSION);
    let match_arm = g.visible("match_arm", MATCH_ARM);
    let list = g.visible("list_expression", LIST_EXPRESSION);
    let dictionary = g.visible("dictionary", DICTIONARY);
    let dictionary_entry = g.visible("dictionary_entry", DICTIONARY_ENTRY);
    let string = g.visible("string", STRING);
    let interpolation = g.visible("interpolation", INTERPOLATION);

    // =========================================================================
    // STATEMENT LISTS
    // =========================================================================
    g.rule(source_file, rhs![]);
    g.rule(source_file, rhs![stmts]);
    g.rule(stmts, rhs![stmt_list]);
    g.rule(stmts, rhs![last_stmt]);
    g.rule(stmts, rhs![stmt_list, last_stmt]);
    g.rule(stmt_list, rhs![stmt]);
    g.rule(stmt_list, rhs![stmt_list, stmt]);
    for statement in [
        let_declaration,
        immut_declaration,
        expression_statement,
        return_statement,
        throw_statement,
        import_statement,
        export_statement,
        if_statement,
        while_statement,
        for_statement,
        for_in_statement,
        block,
        try_statement,
        function_declaration,
        class_declaration,
    ] {
        g.rule(stmt, rhs![statement]);
    }

    // =========================================================================
    // SIMPLE STATEMENTS (terminated, and unterminated as last statement)
    // =========================================================================
    g.rule(let_declaration, rhs![LET_KW, binding, SEMICOLON]);
    g.rule(last_stmt, rhs![LET_KW, binding]).node(LET_DECLARATION);
    g.rule(immut_declaration, rhs![AT, IMMUT_KW, binding, SEMICOLON]);
    g.rule(last_stmt, rhs![AT, IMMUT_KW, binding]).node(IMMUT_DECLARATION);

    g.rule(binding, rhs![field("name", IDENT)]);
    g.rule(binding, rhs![field("name", IDENT), field("type", type_annotation)]);
    g.rule(binding, rhs![field("name", IDENT), EQ, field("value", expr)]);
    g.rule(
        binding,
        rhs![field("name", IDENT), field("type", type_annotation), EQ, field("value", expr)],
    );

    g.rule(expression_statement, rhs![expr, SEMICOLON]);
    g.rule(last_stmt, rhs![expr]).node(EXPRESSION_STATEMENT);

    g.rule(return_statement, rhs![RETURN_KW, SEMICOLON]);
    g.rule(return_statement, rhs![RETURN_KW, field("value", expr), SEMICOLON]);
    g.rule(last_stmt, rhs![RETURN_KW]).node(RETURN_STATEMENT);
    g.rule(last_stmt, rhs![RETURN_KW, field("value", expr)]).node(RETURN_STATEMENT);

    g.rule(throw_statement, rhs![THROW_KW, field("value", expr), SEMICOLON]);
    g.rule(last_stmt, rhs![THROW_KW, field("value", expr)]).node(THROW_STATEMENT);

    g.rule(import_statement, rhs![IMPORT_KW, field("source", string), SEMICOLON]);
    g.rule(
        import_statement,
        rhs![IMPORT_KW, field("clause", import_clause), FROM_KW, field("source", string), SEMICOLON],
    );
    g.rule(last_stmt, rhs![IMPORT_KW, field("source", string)]).node(IMPORT_STATEMENT);
    g.rule(
        last_stmt,
        rhs![IMPORT_KW, field("clause", import_clause), FROM_KW, field("source", string)],
    )
    .node(IMPORT_STATEMENT);
    g.rule(import_clause, rhs![L_BRACE, names, R_BRACE]);
    g.rule(names, rhs![IDENT]);
    g.rule(names, rhs![names, COMMA, IDENT]);

    g.rule(export_statement, rhs![EXPORT_KW, field("declaration", exportable)]);
    g.rule(exportable, rhs![function_declaration]);
    g.rule(exportable, rhs![class_declaration]);
    g.rule(exportable, rhs![let_declaration]);
    g.rule(exportable, rhs![immut_declaration]);
    g.rule(exportable, rhs![field("name", IDENT), EQ, field("value", expr), SEMICOLON])
        .node(VARIABLE_DECLARATION);

    // =========================================================================
    // COMPOUND STATEMENTS
    // =========================================================================
    g.rule(block, rhs![L_BRACE, R_BRACE]).prec(empty_block);
    g.rule(block, rhs![L_BRACE, stmts, R_BRACE]);

    g.rule(
        if_statement,
        rhs![IF_KW, L_PAREN, field("condition", expr), R_PAREN, field("consequence", stmt)],
    )
    .prec(if_without_else);
    g.rule(
        if_statement,
        rhs![
            IF_KW,
            L_PAREN,
            field("condition", expr),
            R_PAREN,
            field("consequence", stmt),
            ELSE_KW,
            field("alternative", stmt)
        ],
    );

    g.rule(
        while_statement,
        rhs![WHILE_KW, L_PAREN, field("condition", expr), R_PAREN, field("body", stmt)],
    );

    g.rule(
        for_statement,
        rhs![
            FOR_KW,
            L_PAREN,
            field("initializer", for_init),
            SEMICOLON,
            field("condition", opt_expr),
            SEMICOLON,
            field("increment", opt_expr),
            R_PAREN,
            field("body", stmt)
        ],
    );
    g.rule(for_init, rhs![opt_expr]);
    g.rule(for_init, rhs![LET_KW, binding]).node(LET_DECLARATION);
    g.rule(opt_expr, rhs![]);
    g.rule(opt_expr, rhs![expr]);
    g.rule(
        for_in_statement,
        rhs![
            FOR_KW,
            L_PAREN,
            field("left", IDENT),
            IN_KW,
            field("right", expr),
            R_PAREN,
            field("body", stmt)
        ],
    );

    g.rule(try_statement, rhs![TRY_KW, field("body", block), field("handler", catch_clause)]);
    g.rule(
        catch_clause,
        rhs![CATCH_KW, L_PAREN, field("parameter", IDENT), R_PAREN, field("body", block)],
    );

    // =========================================================================
    // FUNCTIONS AND CLASSES
    // =========================================================================
    g.rule(
        function_declaration,
        rhs![DOLLAR, field("name", IDENT), field("parameters", parameter_list), field("body", block)],
    );
    g.rule(
        function_declaration,
        rhs![
            DOLLAR,
            field("name", IDENT),
            field("parameters", parameter_list),
            field("return_type", type_annotation),
            field("body", block)
        ],
    );
    g.rule(parameter_list, rhs![L_PAREN, R_PAREN]);
    g.rule(parameter_list, rhs![L_PAREN, params, R_PAREN]);
    g.rule(params, rhs![parameter]);
    g.rule(params, rhs![params, COMMA, parameter]);
    g.rule(parameter, rhs![field("name", IDENT)]);
    g.rule(parameter, rhs![field("name", IDENT), field("type", type_annotation)]);

    g.rule(class_declaration, rhs![CLASS_KW, field("name", IDENT), field("body", class_body)]);
    g.rule(class_body, rhs![L_BRACE, R_BRACE]);
    g.rule(class_body, rhs![L_BRACE, methods, R_BRACE]);
    g.rule(methods, rhs![function_declaration]);
    g.rule(methods, rhs![methods, function_declaration]);

    g.rule(type_annotation, rhs![COLON, type_]);
    for &keyword in TYPE_KEYWORDS {
        g.rule(type_, rhs![keyword]);
    }
    g.rule(type_, rhs![ARRAY_TYPE_KW, L_BRACKET, field("element", type_), R_BRACKET]);

    // =========================================================================
    // EXPRESSIONS
    // =========================================================================
    g.rule(expr, rhs![IDENT]);
    g.rule(expr, rhs![THIS_KW]);
    for literal in [NUMBER, TRUE_KW, FALSE_KW, NULL_KW] {
        g.rule(expr, rhs![literal]).node(LITERAL);
    }
    for primary in [string, list, dictionary, match_expression, lambda] {
        g.rule(expr, rhs![primary]);
    }
    g.rule(expr, rhs![L_PAREN, expr, R_PAREN]).node(PARENTHESIZED_EXPRESSION);

    for &operator in BINARY_OPERATORS {
        g.rule(
            expr,
            rhs![field("left", expr), field("operator", operator), field("right", expr)],
        )
        .node(BINARY_EXPRESSION);
    }
    for &operator in ASSIGNMENT_OPERATORS {
        g.rule(
            expr,
            rhs![field("left", expr), field("operator", operator), field("right", expr)],
        )
        .node(ASSIGNMENT_EXPRESSION);
    }
    for operator in [BANG, MINUS] {
        g.rule(expr, rhs![field("operator", operator), field("argument", expr)])
            .node(UNARY_EXPRESSION)
            .prec(unary);
    }
    g.rule(expr, rhs![field("function", expr), field("arguments", argument_list)])
        .node(CALL_EXPRESSION);
    g.rule(expr, rhs![field("object", expr), DOT, field("property", IDENT)])
        .node(MEMBER_EXPRESSION);
    g.rule(
        expr,
        rhs![field("object", expr), L_BRACKET, field("index", expr), R_BRACKET],
    )
    .node(INDEX_EXPRESSION);

    g.rule(argument_list, rhs![L_PAREN, R_PAREN]);
    g.rule(argument_list, rhs![L_PAREN, elements, R_PAREN]);
    g.rule(list, rhs![L_BRACKET, R_BRACKET]);
    g.rule(list, rhs![L_BRACKET, elements, R_BRACKET]);
    g.rule(elements, rhs![expr]);
    g.rule(elements, rhs![elements, COMMA, expr]);

    g.rule(dictionary, rhs![L_BRACE, R_BRACE]);
    g.rule(dictionary, rhs![L_BRACE, entries, R_BRACE]);
    g.rule(entries, rhs![dictionary_entry]);
    g.rule(entries, rhs![entries, COMMA, dictionary_entry]);
    g.rule(dictionary_entry, rhs![field("key", string), COLON, field("value", expr)]);

    g.rule(
        lambda,
        rhs![DOLLAR, field("parameters", parameter_list), FAT_ARROW, field("body", expr)],
    )
    .prec(lambda_prec);
    g.rule(
        lambda,
        rhs![DOLLAR, field("parameters", parameter_list), FAT_ARROW, field("body", block)],
    );

    g.rule(
        match_expression,
        rhs![MATCH_KW, L_PAREN, field("value", expr), R_PAREN, L_BRACE, R_BRACE],
    );
    g.rule(
        match_expression,
        rhs![MATCH_KW, L_PAREN, field("value", expr), R_PAREN, L_BRACE, arms, R_BRACE],
    );
    g.rule(arms, rhs![match_arm]);
    g.rule(arms, rhs![arms, match_arm]);
    g.rule(
        match_arm,
        rhs![field("pattern", expr), FAT_ARROW, field("value", expr), COMMA],
    );
    g.rule(
        match_arm,
        rhs![
            field("pattern", expr),
            IF_KW,
            field("guard", expr),
            FAT_ARROW,
            field("value", expr),
            COMMA
        ],
    );
    g.rule(
        match_arm,
        rhs![field("pattern", UNDERSCORE), FAT_ARROW, field("value", expr), COMMA],
    );

    g.rule(string, rhs![STRING_START, STRING_END]);
    g.rule(string, rhs![STRING_START, string_parts, STRING_END]);
    g.rule(string_parts, rhs![string_part]);
    g.rule(string_parts, rhs![string_parts, string_part]);
    g.rule(string_part, rhs![STRING_CONTENT]);
    g.rule(string_part, rhs![ESCAPE_SEQUENCE]);
    g.rule(string_part, rhs![interpolation]);
    g.rule(
        interpolation,
        rhs![INTERPOLATION_START, field("expression", expr), INTERPOLATION_END],
    );

    g.build(source_file)
}

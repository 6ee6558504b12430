//! End-to-end runs over a parsed header dump, checking the generated
//! statement surfaces.

use ffigen_core::php::{Arg, Expr, Stmt};
use ffigen_metagen::MetadataGenerator;
use pretty_assertions::assert_eq;

const HEADER_DUMP: &str = r#"
    <CastXML format="1.4.0">
      <Namespace id="_1" name="::" members="_t1 _t2 _t3 _t4 _f1 _f2 _f3 _f4 _f5"/>
      <FundamentalType id="_int" name="int" size="32" align="32"/>
      <FundamentalType id="_void" name="void" size="0" align="8"/>
      <FundamentalType id="_char" name="char" size="8" align="8"/>
      <PointerType id="_pc" type="_char"/>
      <Struct id="_s1" name="point" location="f0:1" members="_x _y"/>
      <Field id="_x" name="x" type="_int"/>
      <Field id="_y" name="y" type="_int"/>
      <Typedef id="_t1" name="Point" type="_s1" location="f0:3"/>
      <Enumeration id="_e1" name="color" size="32" align="32" location="f0:5">
        <EnumValue name="RED" init="0"/>
        <EnumValue name="GREEN" init="1"/>
        <EnumValue name="BLUE" init="2"/>
      </Enumeration>
      <Typedef id="_t2" name="Color" type="_e1" location="f0:6"/>
      <Struct id="_s2" name="opaque" location="f0:8" incomplete="1"/>
      <Typedef id="_t3" name="Opaque" type="_s2" location="f0:8"/>
      <Struct id="_s3" name="hidden" location="f1:1" members=""/>
      <Typedef id="_t4" name="Hidden" type="_s3" location="f1:2"/>
      <PointerType id="_p1" type="_t1"/>
      <Function id="_f1" name="make_point" returns="_p1" location="f0:10">
        <Argument name="x" type="_int"/>
        <Argument name="y" type="_int"/>
      </Function>
      <Function id="_f2" name="next_color" returns="_t2" location="f0:11">
        <Argument name="current" type="_t2"/>
      </Function>
      <Function id="_f3" name="hidden_fn" returns="_void" location="f1:3"/>
      <Function id="_f4" name="log_msg" returns="_void" location="f0:12">
        <Argument name="fmt" type="_pc"/>
        <Ellipsis/>
      </Function>
      <Function id="_f5" name="clone_point" returns="_t1" location="f0:13">
        <Argument name="src" type="_t1"/>
      </Function>
      <File id="f0" name="/workspace/point.h"/>
      <File id="f1" name="/usr/include/hidden.h"/>
    </CastXML>
"#;

fn generate() -> ffigen_core::php::GeneratedMetadata {
    let unit = ffigen_castxml::parse_str(HEADER_DUMP).unwrap();
    MetadataGenerator::default().generate(&unit)
}

/// Every top-level function call statement named `name`.
fn calls<'a>(stmts: &'a [Stmt], name: &str) -> Vec<&'a Vec<Arg>> {
    stmts
        .iter()
        .filter_map(|stmt| match stmt {
            Stmt::Expression(Expr::FuncCall { name: n, args }) if n == name => Some(args),
            _ => None,
        })
        .collect()
}

fn static_call_method(arg: &Arg) -> Option<&str> {
    match &arg.value {
        Expr::StaticCall { method, .. } => Some(method),
        _ => None,
    }
}

fn arguments_set_name(arg: &Arg) -> Option<&str> {
    match &arg.value {
        Expr::FuncCall { name, args } if name == "argumentsSet" => match &args[0].value {
            Expr::Str(s) => Some(s),
            _ => None,
        },
        _ => None,
    }
}

#[test]
fn namespaces_are_named() {
    let meta = generate();

    assert_eq!(meta.internal.name, "PHPSTORM_META");
    assert_eq!(meta.external.name, "FFI\\Generated");
}

#[test]
fn enum_cases_are_registered_as_arguments_set() {
    let meta = generate();

    let sets = calls(&meta.internal.stmts, "registerArgumentsSet");
    let args = sets
        .iter()
        .find(|args| matches!(&args[0].value, Expr::Str(s) if s == "ffi_color"))
        .expect("enum arguments set");

    assert_eq!(
        args[0].comment.as_deref(),
        Some("List of \"Color\" enum cases")
    );
    assert_eq!(args.len(), 4);
    assert_eq!(
        args[1].value,
        Expr::ClassConstFetch {
            class: "\\FFI\\Generated\\Color".to_string(),
            constant: "RED".to_string(),
        }
    );
}

#[test]
fn enum_arguments_and_return_values_are_expected() {
    let meta = generate();

    let expected = calls(&meta.internal.stmts, "expectedArguments");
    let for_next_color: Vec<_> = expected
        .iter()
        .filter(|args| static_call_method(&args[0]) == Some("next_color"))
        .collect();
    assert_eq!(for_next_color.len(), 1);
    assert_eq!(for_next_color[0][1].value, Expr::Int(0));
    assert_eq!(arguments_set_name(&for_next_color[0][2]), Some("ffi_color"));

    let returns = calls(&meta.internal.stmts, "expectedReturnValues");
    assert_eq!(returns.len(), 1);
    assert_eq!(static_call_method(&returns[0][0]), Some("next_color"));
    assert_eq!(arguments_set_name(&returns[0][1]), Some("ffi_color"));
}

#[test]
fn record_coercions_cover_pointer_depths() {
    let meta = generate();

    let overrides = calls(&meta.internal.stmts, "override");
    assert_eq!(overrides.len(), 1);

    let Expr::StaticCall { class, method, args } = &overrides[0][0].value else {
        panic!("expected an entrypoint method reference");
    };
    assert_eq!(class, "\\FFI\\Generated\\EntrypointInterface");
    assert_eq!(method, "new");
    assert_eq!(args[0].value, Expr::Int(0));

    let Expr::FuncCall { name, args } = &overrides[0][1].value else {
        panic!("expected a map() call");
    };
    assert_eq!(name, "map");
    let Expr::Array(items) = &args[0].value else {
        panic!("expected a mapping array");
    };

    let pairs: Vec<(&str, &str)> = items
        .iter()
        .map(|item| {
            let Expr::Str(value) = &item.value else {
                panic!("expected string mapping values");
            };
            (item.key.as_deref().unwrap(), value.as_str())
        })
        .collect();

    assert_eq!(
        pairs,
        vec![
            ("", "\\PHPSTORM_META\\@"),
            ("Point", "\\PHPSTORM_META\\Point"),
            ("Point*", "\\PHPSTORM_META\\Point[]"),
            ("Point**", "\\PHPSTORM_META\\Point[]"),
            ("Point**", "\\PHPSTORM_META\\Point[][]"),
        ]
    );
    assert_eq!(
        items[0].comment.as_deref(),
        Some("List of return type coercions")
    );
}

#[test]
fn record_layout_classes_are_declared() {
    let meta = generate();

    let classes: Vec<_> = meta
        .internal
        .stmts
        .iter()
        .filter_map(|stmt| match stmt {
            Stmt::Class(decl) => Some(decl),
            _ => None,
        })
        .collect();

    let names: Vec<&str> = classes.iter().map(|c| c.name.as_str()).collect();
    assert!(names.contains(&"Point"));
    assert!(!names.contains(&"Hidden"));

    let point = classes.iter().find(|c| c.name == "Point").unwrap();
    assert!(point.is_final);
    assert_eq!(point.extends.as_deref(), Some("\\FFI\\CData"));
    assert!(point
        .doc
        .as_deref()
        .unwrap()
        .starts_with("Generated \"Point\" structure layout."));

    assert_eq!(point.properties.len(), 2);
    assert_eq!(point.properties[0].name, "x");
    assert_eq!(point.properties[0].ty, "int");
    assert_eq!(
        point.properties[0].doc.as_deref(),
        Some("@var int<-2147483648, 2147483647>")
    );

    assert_eq!(point.methods.len(), 1);
    let constructor = &point.methods[0];
    assert_eq!(constructor.name, "__construct");
    assert!(constructor
        .doc
        .as_deref()
        .unwrap()
        .contains("with 'Point' argument instead"));
}

#[test]
fn type_registry_lists_builtins_and_user_types() {
    let meta = generate();

    let sets = calls(&meta.internal.stmts, "registerArgumentsSet");
    let args = sets
        .iter()
        .find(|args| matches!(&args[0].value, Expr::Str(s) if s == "ffi_types_list"))
        .expect("type list arguments set");

    assert_eq!(
        args[0].comment.as_deref(),
        Some("List of available FFI type names")
    );

    let names: Vec<&str> = args[1..]
        .iter()
        .map(|arg| match &arg.value {
            Expr::Str(s) => s.as_str(),
            other => panic!("expected a type name string, got {other:?}"),
        })
        .collect();

    for builtin in ["void*", "int", "uint64_t"] {
        assert!(names.contains(&builtin), "missing builtin {builtin}");
    }
    for user in ["Point", "Point*", "Point**", "Color"] {
        assert!(names.contains(&user), "missing user type {user}");
    }
    // Incomplete records are not creatable, excluded paths not surfaced,
    // enums get no pointer spellings.
    for absent in ["Opaque", "Hidden", "Color*"] {
        assert!(!names.contains(&absent), "unexpected type {absent}");
    }

    let expected = calls(&meta.internal.stmts, "expectedArguments");
    for method in ["new", "cast", "type"] {
        let matching: Vec<_> = expected
            .iter()
            .filter(|args| {
                static_call_method(&args[0]) == Some(method)
                    && arguments_set_name(&args[2]) == Some("ffi_types_list")
            })
            .collect();
        assert_eq!(matching.len(), 1, "one registry expectation for {method}");
        assert_eq!(matching[0][1].value, Expr::Int(0));
    }
}

#[test]
fn entrypoint_interface_exports_functions() {
    let meta = generate();

    let interfaces: Vec<_> = meta
        .external
        .stmts
        .iter()
        .filter_map(|stmt| match stmt {
            Stmt::Interface(decl) => Some(decl),
            _ => None,
        })
        .collect();
    assert_eq!(interfaces.len(), 1);

    let interface = interfaces[0];
    assert_eq!(interface.name, "EntrypointInterface");

    let names: Vec<&str> = interface.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["make_point", "next_color", "log_msg", "clone_point"]
    );

    let make_point = &interface.methods[0];
    assert_eq!(make_point.return_ty.as_deref(), Some("?\\FFI\\CData"));
    assert_eq!(make_point.params.len(), 2);
    assert_eq!(make_point.params[0].name, "x");
    assert_eq!(make_point.params[0].ty, "int");
    let doc = make_point.doc.as_deref().unwrap();
    assert!(doc.contains("@param int<-2147483648, 2147483647> $x"));
    assert!(doc.contains("@return null|\\FFI\\CData|array{\\PHPSTORM_META\\Point}"));

    let next_color = &interface.methods[1];
    assert_eq!(next_color.return_ty.as_deref(), Some("int"));

    let param = &next_color.params[0];
    assert_eq!(param.name, "current");
    assert_eq!(param.attributes.len(), 1);

    let attribute = &param.attributes[0];
    assert_eq!(attribute.name, "\\JetBrains\\PhpStorm\\ExpectedValues");
    assert_eq!(attribute.args[0].name.as_deref(), Some("flags"));
    let Expr::Array(flags) = &attribute.args[0].value else {
        panic!("expected a flags array");
    };
    assert_eq!(flags.len(), 3);
    assert_eq!(
        flags[0].value,
        Expr::ClassConstFetch {
            class: "\\FFI\\Generated\\Color".to_string(),
            constant: "RED".to_string(),
        }
    );

    // The return expectation is carried as a method attribute too.
    assert_eq!(next_color.attributes.len(), 1);

    let log_msg = &interface.methods[2];
    assert_eq!(log_msg.return_ty.as_deref(), Some("void"));
    assert_eq!(log_msg.params[0].name, "fmt");
    assert_eq!(log_msg.params[0].ty, "string|\\FFI\\CData");
    assert!(log_msg.params[0].variadic);

    // Records passed and returned by value travel as cdata, with the
    // layout class surfaced in the docs.
    let clone_point = &interface.methods[3];
    assert_eq!(clone_point.return_ty.as_deref(), Some("?\\FFI\\CData"));
    assert_eq!(clone_point.params[0].name, "src");
    assert_eq!(clone_point.params[0].ty, "?\\FFI\\CData");
    let doc = clone_point.doc.as_deref().unwrap();
    assert!(doc.contains("@param \\PHPSTORM_META\\Point $src"));
    assert!(doc.contains("@return \\PHPSTORM_META\\Point"));
}

//! Tests for brace-depth function detection

#[cfg(test)]
mod brace_tests {
    use crate::language::{FunctionDetector, Language};
    use crate::record::FunctionRecord;
    use crate::source::lines_of;

    fn detect(src: &str, language: Language) -> Vec<FunctionRecord> {
        FunctionDetector::for_language(language)
            .parse_lines(lines_of(src), "test")
            .unwrap()
    }

    fn spans(records: &[FunctionRecord]) -> Vec<(&str, usize, usize)> {
        records
            .iter()
            .map(|r| (r.name(), r.start_line(), r.end_line()))
            .collect()
    }

    #[test]
    fn test_same_line_brace() {
        let records = detect("function f() {\n  return 1;\n}", Language::JavaScript);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name(), "f");
        assert_eq!(records[0].start_line(), 1);
        assert_eq!(records[0].end_line(), 3);
        assert_eq!(records[0].size(), 3);
    }

    #[test]
    fn test_one_line_body() {
        let records = detect("function f() { return 1; }", Language::JavaScript);
        assert_eq!(spans(&records), vec![("f", 1, 1)]);
        assert_eq!(records[0].size(), 1);
    }

    #[test]
    fn test_brace_on_next_line() {
        let src = "public class A {\n    public void run()\n    {\n        go();\n    }\n}\n";
        let records = detect(src, Language::Java);
        assert_eq!(spans(&records), vec![("run", 2, 5)]);
    }

    #[test]
    fn test_multiline_signature_starts_at_first_line() {
        let src = r#"class A {
    public String largeMethod(int x,
                              String y)
            throws IOException {
        return y;
    }
}
"#;
        let records = detect(src, Language::Java);
        assert_eq!(spans(&records), vec![("largeMethod", 2, 6)]);
    }

    #[test]
    fn test_interface_signature_discarded() {
        let src = r#"interface Shape {
    double area();
}
class Circle implements Shape {
    public double area() {
        return 3.14;
    }
}
"#;
        let records = detect(src, Language::Java);
        assert_eq!(spans(&records), vec![("area", 5, 7)]);
    }

    #[test]
    fn test_pending_discarded_by_new_declaration() {
        let src = r#"abstract class Base {
    public abstract void step()
    public void run() {
        step();
    }
}
"#;
        let records = detect(src, Language::Java);
        assert_eq!(spans(&records), vec![("run", 3, 5)]);
    }

    #[test]
    fn test_pending_discarded_at_end_of_file() {
        let records = detect("public void dangling()\n", Language::Java);
        assert!(records.is_empty());
    }

    #[test]
    fn test_string_with_braces_does_not_perturb_depth() {
        let src = r#"function f() {
  const s = "{ not a scope }";
  const t = '}';
  return s + t;
}
"#;
        let records = detect(src, Language::JavaScript);
        assert_eq!(spans(&records), vec![("f", 1, 5)]);
    }

    #[test]
    fn test_comments_with_braces_ignored() {
        let src = r#"function f() {
  // }
  /* {
     } */
  return 1;
}
"#;
        let records = detect(src, Language::JavaScript);
        assert_eq!(spans(&records), vec![("f", 1, 6)]);
    }

    #[test]
    fn test_template_literal_with_braces() {
        let src = "function render(x) {\n  return `<div>${x}}\n  {</div>`;\n}\n";
        let records = detect(src, Language::TypeScript);
        assert_eq!(spans(&records), vec![("render", 1, 4)]);
    }

    #[test]
    fn test_nested_functions_close_innermost_first() {
        let src = r#"function outer() {
  function inner() {
    return 1;
  }
  return inner();
}
"#;
        let records = detect(src, Language::JavaScript);
        assert_eq!(spans(&records), vec![("inner", 2, 4), ("outer", 1, 6)]);
        assert!(records[1].contains(&records[0]));
    }

    #[test]
    fn test_simultaneous_close_orders_inner_first() {
        let src = "function a() { function b() {\n  return 1;\n}}\n";
        let records = detect(src, Language::JavaScript);
        assert_eq!(spans(&records), vec![("b", 1, 3), ("a", 1, 3)]);
    }

    #[test]
    fn test_control_flow_blocks_are_not_functions() {
        let src = r#"function f(x) {
  if (x) {
    for (let i = 0; i < x; i++) {
      go(i);
    }
  } else {
    stop();
  }
}
"#;
        let records = detect(src, Language::JavaScript);
        assert_eq!(spans(&records), vec![("f", 1, 9)]);
    }

    #[test]
    fn test_default_object_parameter_does_not_open_scope() {
        let src = "function f(opts = {}) {\n  return opts;\n}\n";
        let records = detect(src, Language::JavaScript);
        assert_eq!(spans(&records), vec![("f", 1, 3)]);
    }

    #[test]
    fn test_arrow_functions_and_methods() {
        let src = r#"const arrowFunction = () => {
  return 1;
};

class Service {
  async load(id) {
    return id;
  }

  static create() {
    return new Service();
  }
}
"#;
        let records = detect(src, Language::JavaScript);
        assert_eq!(
            spans(&records),
            vec![("arrowFunction", 1, 3), ("load", 6, 8), ("create", 10, 12)]
        );
    }

    #[test]
    fn test_expression_bodied_arrow_has_no_record() {
        let src = "const double = (x) => x * 2;\nif (ok) {\n  run();\n}\n";
        assert!(detect(src, Language::JavaScript).is_empty());
    }

    #[test]
    fn test_unterminated_scope_dropped() {
        let src = "function ok() {\n}\nfunction broken() {\n  if (x) {\n";
        let records = detect(src, Language::JavaScript);
        assert_eq!(spans(&records), vec![("ok", 1, 2)]);
    }

    #[test]
    fn test_unbalanced_close_is_ignored() {
        let src = "}\n}\nfunction f() {\n  return 1;\n}\n";
        let records = detect(src, Language::JavaScript);
        assert_eq!(spans(&records), vec![("f", 3, 5)]);
    }

    #[test]
    fn test_anonymous_default_export() {
        let src = "export default function () {\n  return 1;\n}\n";
        let records = detect(src, Language::JavaScript);
        assert_eq!(spans(&records), vec![("<anonymous>", 1, 3)]);
    }

    #[test]
    fn test_java_anonymous_class_method() {
        let src = r#"class A {
    void start() {
        Runnable r = new Runnable() {
            public void run() {
                work();
            }
        };
        r.run();
    }
}
"#;
        let records = detect(src, Language::Java);
        assert_eq!(spans(&records), vec![("run", 4, 6), ("start", 2, 9)]);
    }

    #[test]
    fn test_csharp_methods() {
        let src = r#"namespace App
{
    public class Repo
    {
        public Repo(string name)
        {
            Name = name;
        }

        public string Name { get; set; }

        public async Task<int> CountAsync(string filter)
        {
            var s = $"{filter}";
            return await Query(s);
        }

        public abstract void Reset();

        public override string ToString() => Name;
    }
}
"#;
        let records = detect(src, Language::CSharp);
        assert_eq!(spans(&records), vec![("Repo", 5, 8), ("CountAsync", 12, 16)]);
    }

    #[test]
    fn test_csharp_generic_method_with_constraint() {
        let src = r#"class C
{
    public static T Get<T>(string key)
        where T : class, new()
    {
        return new T();
    }
}
"#;
        let records = detect(src, Language::CSharp);
        assert_eq!(spans(&records), vec![("Get", 3, 7)]);
    }

    #[test]
    fn test_expression_arrow_does_not_claim_next_block() {
        let src = "const double = x => x * 2\nif (ready) {\n  go()\n}\n";
        assert!(detect(src, Language::JavaScript).is_empty());
    }

    #[test]
    fn test_expression_arrow_does_not_enclose_class() {
        let src = "const inc = (a) => a + 1\nclass Foo {\n  bar() {\n    x()\n  }\n}\n";
        let records = detect(src, Language::JavaScript);
        assert_eq!(spans(&records), vec![("bar", 3, 5)]);
    }

    #[test]
    fn test_expression_arrow_properties_without_semicolons() {
        let src = "const api = {\n  get: (id) => fetch(id),\n  list: () => items\n}\nfunction load() {\n  run()\n}\n";
        let records = detect(src, Language::JavaScript);
        assert_eq!(spans(&records), vec![("load", 5, 7)]);
    }

    #[test]
    fn test_block_arrow_still_detected() {
        let src = "const add = (a, b) =>\n{\n  return a + b\n}\nconst sub = (a, b) => {\n  return a - b\n}\n";
        let records = detect(src, Language::JavaScript);
        assert_eq!(spans(&records), vec![("add", 1, 4), ("sub", 5, 7)]);
    }

    #[test]
    fn test_reparse_is_identical() {
        let src = "function a() {\n  const b = () => {\n    return 1;\n  };\n}\n";
        let first = detect(src, Language::JavaScript);
        let second = detect(src, Language::JavaScript);
        assert_eq!(first, second);
    }
}

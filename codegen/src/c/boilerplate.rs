//! Fixed parts of every generated module.

use strum::IntoEnumIterator;

use crate::{TermKind, UNBOUND};

/// Includes, the host callback table and helpers used by all routines.
pub fn prelude(num_ops: usize, max_arity: usize) -> Vec<String> {
    let mut lines = vec![
        "#include <stdint.h>".to_string(),
        "#include <stdlib.h>".to_string(),
        String::new(),
        "typedef uint32_t term;".to_string(),
        String::new(),
    ];
    for kind in TermKind::iter() {
        lines.push(format!("#define {} {}", kind.as_ref(), kind as u32));
    }
    lines.push(format!("#define INNERC_UNBOUND {UNBOUND}u"));
    lines.push(format!("#define NUM_OPS {num_ops}u"));
    lines.push(format!("#define MAX_ARITY {max_arity}u"));
    lines.push(String::new());
    lines.extend(RUNTIME.lines().map(str::to_string));
    lines
}

const RUNTIME: &str = r#"typedef struct {
  void *ctx;
  uint32_t (*kind)(void *ctx, term t);
  uint32_t (*symbol)(void *ctx, term t);
  uint32_t (*arity)(void *ctx, term t);
  term (*arg)(void *ctx, term t, uint32_t i);
  term (*make_app)(void *ctx, uint32_t op, uint32_t n, const term *args);
  term (*make_var_app)(void *ctx, uint32_t var, uint32_t n, const term *args);
  term (*make_var)(void *ctx, uint32_t var);
  term (*compose)(void *ctx, term head, uint32_t n, const term *args);
} innerc_runtime;

/* Table growth doubles; larger indexes would overflow its length. */
#define MAX_SUBSTS (1u << 30)

static innerc_runtime RT;
static term TRUE_TERM = INNERC_UNBOUND;
static term *substs = 0;
static uint32_t substs_len = 0;

#define ARG(t, i) RT.arg(RT.ctx, (t), (i))

term rewrite(term t);

static inline int is_app(term t, uint32_t op, uint32_t n) {
  return RT.kind(RT.ctx, t) == INNERC_APP && RT.symbol(RT.ctx, t) == op && RT.arity(RT.ctx, t) == n;
}

int set_subst(uint32_t var, term value) {
  if (var >= substs_len) {
    if (var >= MAX_SUBSTS) return -1;
    uint32_t len = substs_len ? substs_len : 16;
    while (len <= var) len *= 2;
    term *grown = (term *) realloc(substs, (size_t) len * sizeof(term));
    if (!grown) return -1;
    for (uint32_t i = substs_len; i < len; i++) grown[i] = INNERC_UNBOUND;
    substs = grown;
    substs_len = len;
  }
  substs[var] = value;
  return 0;
}

term get_subst(uint32_t var) {
  return var < substs_len ? substs[var] : INNERC_UNBOUND;
}

void clear_subst(uint32_t var) {
  if (var < substs_len) substs[var] = INNERC_UNBOUND;
}

void clear_substs(void) {
  for (uint32_t i = 0; i < substs_len; i++) substs[i] = INNERC_UNBOUND;
}

static term rebuild(term t, uint32_t op, uint32_t n) {
  if (n == 0) return t;
  term small[8];
  term *args = n <= 8 ? small : (term *) malloc(n * sizeof(term));
  if (!args) return t;
  for (uint32_t i = 0; i < n; i++) args[i] = rewrite(ARG(t, i));
  term result = RT.make_app(RT.ctx, op, n, args);
  if (args != small) free(args);
  return result;
}

static term rewrite_var_app(term t, uint32_t var, uint32_t n) {
  term small[8];
  term *args = n <= 8 ? small : (term *) malloc(n * sizeof(term));
  if (!args) return t;
  term bound = get_subst(var);
  term result;
  if (bound != INNERC_UNBOUND) {
    for (uint32_t i = 0; i < n; i++) args[i] = ARG(t, i);
    result = rewrite(RT.compose(RT.ctx, bound, n, args));
  } else {
    for (uint32_t i = 0; i < n; i++) args[i] = rewrite(ARG(t, i));
    result = RT.make_var_app(RT.ctx, var, n, args);
  }
  if (args != small) free(args);
  return result;
}
"#;

/// `rewrite_init`/`rewrite_fini` and the generic entry point.
///
/// `true_op` is the id of `true`, which conditions are compared against.
pub fn entry_points(true_op: Option<u32>, arities: &[usize]) -> Vec<String> {
    let mut lines = vec!["int rewrite_init(const innerc_runtime *rt) {".to_string(), "  RT = *rt;".to_string()];
    if let Some(op) = true_op {
        lines.push(format!("  TRUE_TERM = RT.make_app(RT.ctx, {op}u, 0, 0);"));
    }
    lines.extend(
        ["  return 0;", "}", "", "void rewrite_fini(void) {", "  free(substs);", "  substs = 0;", "  substs_len = 0;", "}", ""]
            .map(str::to_string),
    );

    lines.push("term rewrite(term t) {".to_string());
    lines.push("  switch (RT.kind(RT.ctx, t)) {".to_string());
    lines.push("  case INNERC_VAR: {".to_string());
    lines.push("    term bound = get_subst(RT.symbol(RT.ctx, t));".to_string());
    lines.push("    return bound == INNERC_UNBOUND ? t : bound;".to_string());
    lines.push("  }".to_string());
    lines.push("  case INNERC_APP: {".to_string());
    lines.push("    uint32_t op = RT.symbol(RT.ctx, t);".to_string());
    lines.push("    uint32_t n = RT.arity(RT.ctx, t);".to_string());
    if !arities.is_empty() {
        lines.push("    if (op < NUM_OPS) {".to_string());
        lines.push("      switch (n) {".to_string());
        for &arity in arities {
            let args = (0..arity).map(|i| format!("ARG(t, {i})")).collect::<Vec<_>>().join(", ");
            lines.push(format!("      case {arity}: if (table_{arity}[op]) return table_{arity}[op]({args}); break;"));
        }
        lines.push("      }".to_string());
        lines.push("    }".to_string());
    }
    lines.push("    return rebuild(t, op, n);".to_string());
    lines.push("  }".to_string());
    lines.push("  case INNERC_VAR_APP:".to_string());
    lines.push("    return rewrite_var_app(t, RT.symbol(RT.ctx, t), RT.arity(RT.ctx, t));".to_string());
    lines.push("  }".to_string());
    lines.push("  return t;".to_string());
    lines.push("}".to_string());
    lines
}

//! CSV serialization of query answers

use chaser_api::ns::xsd;
use chaser_api::skolem::Skolemization;
use chaser_api::term::Term;

/// Serialize one answer as a CSV line (including the final newline)
pub fn csv_row(terms: &[Term], namer: &Skolemization, buffer: &mut String) {
    for (i, term) in terms.iter().enumerate() {
        if i > 0 {
            buffer.push(',');
        }
        csv_field(term, namer, buffer);
    }
    buffer.push('\n');
}

/// Serialize one term as a CSV field,
/// named nulls being replaced by their external name
pub fn csv_field(term: &Term, namer: &Skolemization, buffer: &mut String) {
    let txt = match term {
        Term::AbstractConstant(name) => name.to_string(),
        Term::DatatypeConstant {
            lexical_value,
            datatype,
        } if datatype.as_ref() == xsd::STRING => lexical_value.to_string(),
        Term::NamedNull(null) => namer.name(null).to_string(),
        _ => term.to_string(),
    };
    if txt.contains([',', '"', '\n', '\r']) {
        buffer.push('"');
        for c in txt.chars() {
            if c == '"' {
                buffer.push('"');
            }
            buffer.push(c);
        }
        buffer.push('"');
    } else {
        buffer.push_str(&txt);
    }
}

//! Extraction of taxpayer data from the SII `getstc` result page.
//!
//! The page is old table-based HTML with no ids or classes, so everything
//! is located by position. The selectors below mirror the page structure
//! `/html/body/div/div[4]` (legal name) and `/html/body/div/table[1]/tr`
//! (activity rows). An HTML5 parser inserts `<tbody>` under `<table>`, so
//! the row selector accepts both shapes.

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::debug;

use crate::model::{Activity, TaxpayerRecord};
use crate::rut::NormalizedRut;

/// Location of the legal name ("razón social").
pub const NAME_SELECTOR: &str = "html > body > div > div:nth-of-type(4)";

/// Location of the rows of the economic activities table.
pub const ACTIVITY_ROWS_SELECTOR: &str = "html > body > div > table:nth-of-type(1) > tr, \
     html > body > div > table:nth-of-type(1) > tbody > tr";

/// Value of the "afecta IVA" column that means yes.
pub const AFFIRMATIVE: &str = "Si";

/// Number of `td > font` cells an activity row has.
const ACTIVITY_COLUMNS: usize = 5;

/// Characters stripped from cell text. `&nbsp;` is not among them.
const CELL_PADDING: &[char] = &[' ', '\t', '\n', '\r', '\0', '\x0B'];

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid selector {selector:?}: {reason}")]
    Selector {
        selector: &'static str,
        reason: String,
    },
}

fn selector(source: &'static str) -> Result<Selector, ExtractError> {
    Selector::parse(source).map_err(|e| ExtractError::Selector {
        selector: source,
        reason: e.to_string(),
    })
}

/// Parse a lookup result page into a [`TaxpayerRecord`] for `rut`.
///
/// Malformed markup never fails the extraction: a missing name yields an
/// empty string and rows of unexpected shape are skipped.
pub fn extract(document: &str, rut: &NormalizedRut) -> Result<TaxpayerRecord, ExtractError> {
    let html = Html::parse_document(document);
    if !html.errors.is_empty() {
        debug!(count = html.errors.len(), "ignored HTML parse errors");
    }

    let name = extract_name(&html)?;
    let activities = extract_activities(&html)?;

    Ok(TaxpayerRecord {
        rut: rut.body().to_string(),
        name,
        activities,
    })
}

/// Trimmed text of the first node at [`NAME_SELECTOR`], or `""`.
pub fn extract_name(html: &Html) -> Result<String, ExtractError> {
    let name_selector = selector(NAME_SELECTOR)?;
    Ok(html
        .select(&name_selector)
        .next()
        .map(|node| trim_cell(&text_of(node)).to_string())
        .unwrap_or_default())
}

/// Activities in document order, with the header row dropped.
pub fn extract_activities(html: &Html) -> Result<Vec<Activity>, ExtractError> {
    let rows_selector = selector(ACTIVITY_ROWS_SELECTOR)?;
    Ok(skip_first_zero_code(
        html.select(&rows_selector).filter_map(parse_row),
    ))
}

/// Drop the first activity whose code is zero and keep every other one.
///
/// The SII table starts with a header row whose code column is not a
/// number; later zero-code rows are real entries.
pub fn skip_first_zero_code(rows: impl IntoIterator<Item = Activity>) -> Vec<Activity> {
    let (_, activities) = rows.into_iter().fold(
        (false, Vec::new()),
        |(seen_header, mut kept), activity| {
            if !seen_header && activity.code == 0 {
                return (true, kept);
            }
            kept.push(activity);
            (seen_header, kept)
        },
    );
    activities
}

/// Read one `<tr>` as an activity, or `None` if it is not five cells wide.
fn parse_row(row: ElementRef<'_>) -> Option<Activity> {
    let cells: Vec<String> = child_elements(row, "td")
        .flat_map(|td| child_elements(td, "font"))
        .map(|font| trim_cell(&text_of(font)).to_string())
        .collect();

    let [description, code, category, taxable, date]: [String; ACTIVITY_COLUMNS] =
        cells.try_into().ok()?;

    let activity = Activity {
        description,
        code: parse_code(&code),
        category,
        taxable: taxable == AFFIRMATIVE,
        date,
    };
    debug!(
        description = %activity.description,
        code = activity.code,
        category = %activity.category,
        taxable = activity.taxable,
        date = %activity.date,
        "activity row"
    );
    Some(activity)
}

/// Integer value of the leading digits of `text`; `0` when there are none.
/// Values past the `i64` range saturate.
fn parse_code(text: &str) -> i64 {
    let text = trim_cell(text);
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .map(|b| i64::from(b - b'0'))
        .fold(0i64, |acc, digit| {
            let acc = acc.saturating_mul(10);
            if negative {
                acc.saturating_sub(digit)
            } else {
                acc.saturating_add(digit)
            }
        })
}

fn trim_cell(text: &str) -> &str {
    text.trim_matches(CELL_PADDING)
}

fn child_elements<'a>(
    parent: ElementRef<'a>,
    tag: &'static str,
) -> impl Iterator<Item = ElementRef<'a>> {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .filter(move |child| child.value().name() == tag)
}

fn text_of(node: ElementRef<'_>) -> String {
    node.text().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rut::normalize;

    fn page(name: &str, rows: &str) -> String {
        format!(
            r#"<html><head><title>SII</title></head><body>
            <div>
              <div>Consulta Situación Tributaria de Terceros</div>
              <div>Nombre o Razón Social:</div>
              <div>RUT Contribuyente:</div>
              <div>{name}</div>
              <div>87654321-K</div>
              <div>Contribuyente presenta Inicio de Actividades: SI</div>
              <div>Fecha de Inicio de Actividades: 01-03-2019</div>
              <table>{rows}</table>
              <table><tr><td><font>Documento</font></td></tr></table>
            </div>
            </body></html>"#
        )
    }

    fn row(description: &str, code: &str, category: &str, taxable: &str, date: &str) -> String {
        format!(
            "<tr><td><font>{description}</font></td><td><font>{code}</font></td>\
             <td><font>{category}</font></td><td><font>{taxable}</font></td>\
             <td><font>{date}</font></td></tr>"
        )
    }

    fn header() -> String {
        row("Actividades", "Código", "Categoría", "Afecta IVA", "Fecha")
    }

    fn rut() -> NormalizedRut {
        normalize("87654321-K").unwrap()
    }

    #[test]
    fn extracts_name_and_activities() {
        let rows = [
            header(),
            row(" VENTA AL POR MENOR ", "471990", "Primera", "Si", "01-03-2019"),
            row("ASESORIAS", "702000", "Segunda", "No", "15-07-2020"),
        ]
        .concat();
        let record = extract(&page("  COMERCIAL ANDES SPA ", &rows), &rut()).unwrap();

        assert_eq!(record.rut, "87654321");
        assert_eq!(record.name, "COMERCIAL ANDES SPA");
        assert_eq!(record.activities.len(), 2);
        assert_eq!(record.activities[0].description, "VENTA AL POR MENOR");
        assert_eq!(record.activities[0].code, 471990);
        assert!(record.activities[0].taxable);
        assert_eq!(record.activities[1].category, "Segunda");
        assert!(!record.activities[1].taxable);
        assert_eq!(record.activities[1].date, "15-07-2020");
    }

    #[test]
    fn only_first_zero_code_row_is_dropped() {
        let rows = [
            row("CABECERA", "0", "-", "-", "-"),
            row("SIN CODIGO", "0", "Primera", "Si", "02-01-2018"),
            row("TRANSPORTE", "142", "Primera", "Si", "03-01-2018"),
        ]
        .concat();
        let html = Html::parse_document(&page("X", &rows));
        let activities = extract_activities(&html).unwrap();

        assert_eq!(activities.len(), 2);
        assert_eq!(activities[0].code, 0);
        assert_eq!(activities[0].description, "SIN CODIGO");
        assert_eq!(activities[1].code, 142);
    }

    #[test]
    fn zero_code_row_after_real_rows_is_still_dropped_once() {
        let rows = [
            row("TRANSPORTE", "142", "Primera", "Si", "03-01-2018"),
            row("SIN CODIGO", "0", "Primera", "No", "02-01-2018"),
            row("OTRO", "0", "Primera", "No", "04-01-2018"),
        ]
        .concat();
        let html = Html::parse_document(&page("X", &rows));
        let codes: Vec<_> = extract_activities(&html)
            .unwrap()
            .into_iter()
            .map(|a| (a.code, a.description))
            .collect();
        assert_eq!(codes, vec![(142, "TRANSPORTE".into()), (0, "OTRO".into())]);
    }

    #[test]
    fn rows_without_five_cells_are_skipped() {
        let rows = [
            header(),
            "<tr><td><font>Solo</font></td><td><font>4</font></td></tr>".to_string(),
            "<tr><td>sin font</td><td>1</td><td>2</td><td>3</td><td>4</td></tr>".to_string(),
            "<tr><td><font>DOBLE</font><font>extra</font></td><td><font>5</font></td>\
             <td><font>Primera</font></td><td><font>Si</font></td><td><font>d</font></td></tr>"
                .to_string(),
            row("PESCA", "31100", "Primera", "Si", "05-05-2015"),
        ]
        .concat();
        let html = Html::parse_document(&page("X", &rows));
        let activities = extract_activities(&html).unwrap();
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].code, 31100);
    }

    #[test]
    fn empty_table_yields_no_activities() {
        let record = extract(&page("EMPRESA", ""), &rut()).unwrap();
        assert_eq!(record.name, "EMPRESA");
        assert!(record.activities.is_empty());
    }

    #[test]
    fn missing_name_is_empty_string() {
        let record = extract("<html><body><p>Error</p></body></html>", &rut()).unwrap();
        assert_eq!(record.name, "");
        assert!(record.activities.is_empty());
    }

    #[test]
    fn malformed_markup_is_tolerated() {
        let doc = "<html><body><div><div>a<div>b</div><div>c</div><div>NOMBRE<table><tr><td><font>x";
        assert!(extract(doc, &rut()).is_ok());
    }

    #[test]
    fn taxable_requires_exact_affirmative() {
        let rows = [
            header(),
            row("A", "1", "Primera", "Si", "d"),
            row("B", "2", "Primera", " Si ", "d"),
            row("C", "3", "Primera", "SI", "d"),
            row("D", "4", "Primera", "si", "d"),
            row("E", "5", "Primera", "Sí", "d"),
        ]
        .concat();
        let html = Html::parse_document(&page("X", &rows));
        let taxable: Vec<bool> = extract_activities(&html)
            .unwrap()
            .iter()
            .map(|a| a.taxable)
            .collect();
        assert_eq!(taxable, vec![true, true, false, false, false]);
    }

    #[test]
    fn code_uses_leading_digits() {
        assert_eq!(parse_code("471990"), 471990);
        assert_eq!(parse_code(" 42abc "), 42);
        assert_eq!(parse_code("Código"), 0);
        assert_eq!(parse_code(""), 0);
        assert_eq!(parse_code("-7"), -7);
        assert_eq!(parse_code("99999999999999999999"), i64::MAX);
        assert_eq!(parse_code("-99999999999999999999"), i64::MIN);
    }

    #[test]
    fn overflowing_code_is_not_taken_for_header() {
        let rows = [
            header(),
            row("DESBORDE", "99999999999999999999", "Primera", "Si", "d"),
        ]
        .concat();
        let html = Html::parse_document(&page("X", &rows));
        let activities = extract_activities(&html).unwrap();
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].code, i64::MAX);
    }

    #[test]
    fn non_breaking_space_is_not_trimmed() {
        let rows = [
            header(),
            row("A", "1", "Primera", "Si&nbsp;", "d"),
            row("B", "2", "Primera", "\tSi\n", "d"),
        ]
        .concat();
        let html = Html::parse_document(&page("X", &rows));
        let activities = extract_activities(&html).unwrap();
        assert!(!activities[0].taxable);
        assert!(activities[1].taxable);
        let html = Html::parse_document(&page("EMPRESA&nbsp;", ""));
        assert_eq!(extract_name(&html).unwrap(), "EMPRESA\u{a0}");
    }

    #[test]
    fn skip_rule_on_plain_sequence() {
        let activity = |code| Activity {
            description: String::new(),
            code,
            category: String::new(),
            taxable: false,
            date: String::new(),
        };
        let kept = skip_first_zero_code([activity(0), activity(0), activity(142)]);
        let codes: Vec<i64> = kept.iter().map(|a| a.code).collect();
        assert_eq!(codes, vec![0, 142]);
        assert!(skip_first_zero_code(Vec::new()).is_empty());
    }

    #[test]
    fn selectors_compile() {
        assert!(selector(NAME_SELECTOR).is_ok());
        assert!(selector(ACTIVITY_ROWS_SELECTOR).is_ok());
    }
}

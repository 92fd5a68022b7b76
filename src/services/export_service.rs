// src/services/export_service.rs

use crate::models::crm::CustomerRecord;

pub const CSV_FILENAME: &str = "customers.csv";
pub const CSV_CONTENT_TYPE: &str = "text/csv";

const CSV_HEADER: &str = "Name,Email,Phone,Status,Technician,Note,Created At";

/// Gera o CSV de todos os clientes.
///
/// A nota vai sempre entre aspas. Os outros campos só ganham aspas quando
/// têm vírgula, aspas ou quebra de linha; aspas internas são duplicadas.
pub fn customers_to_csv(customers: &[CustomerRecord]) -> String {
    let mut csv = String::with_capacity(CSV_HEADER.len() + 1 + customers.len() * 96);
    csv.push_str(CSV_HEADER);
    csv.push('\n');

    for c in customers {
        let row = [
            escape(&c.name),
            escape(&c.email),
            escape(&c.phone),
            escape(&c.status),
            escape(&c.technician),
            quote(&c.note),
            escape(&c.created_at),
        ];
        csv.push_str(&row.join(","));
        csv.push('\n');
    }

    csv
}

fn escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        quote(value)
    } else {
        value.to_string()
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, note: &str) -> CustomerRecord {
        CustomerRecord {
            id: 1,
            name: name.into(),
            email: "a@b.com".into(),
            phone: "1234567890".into(),
            status: "lead".into(),
            technician: "Tech".into(),
            note: note.into(),
            created_at: "6/10/2024, 2:40:00 PM".into(),
        }
    }

    #[test]
    fn empty_store_exports_only_the_header() {
        assert_eq!(customers_to_csv(&[]), "Name,Email,Phone,Status,Technician,Note,Created At\n");
    }

    #[test]
    fn note_is_always_quoted() {
        let csv = customers_to_csv(&[record("Ana", "hello")]);
        let line = csv.lines().nth(1).unwrap();

        assert_eq!(line, "Ana,a@b.com,1234567890,lead,Tech,\"hello\",\"6/10/2024, 2:40:00 PM\"");
    }

    #[test]
    fn embedded_commas_and_quotes_are_escaped() {
        let csv = customers_to_csv(&[record("Silva, Ana", "she said \"call me\"")]);
        let line = csv.lines().nth(1).unwrap();

        assert!(line.starts_with("\"Silva, Ana\",a@b.com,"));
        assert!(line.contains(",\"she said \"\"call me\"\"\","));
    }

    #[test]
    fn one_line_per_customer_in_order() {
        let csv = customers_to_csv(&[record("Ana", ""), record("Bia", "")]);
        let names: Vec<_> = csv.lines().skip(1).map(|l| l.split(',').next().unwrap()).collect();

        assert_eq!(names, ["Ana", "Bia"]);
    }
}

// src/common/i18n.rs

// Mensagens por idioma. Código de erro -> texto para o usuário.
// Idioma desconhecido cai no inglês.

pub const DEFAULT_LANG: &str = "en";

pub fn message(lang: &str, code: &str) -> &'static str {
    match lang {
        "pt" => message_pt(code),
        _ => message_en(code),
    }
}

fn message_en(code: &str) -> &'static str {
    match code {
        "invalid_phone" => "Phone number must be exactly 10 digits.",
        "invalid_email" => "Please enter a valid email address.",
        "technician_required" => "Please assign a technician.",
        "required_fields" => "One or more required fields are empty.",
        "customer_not_found" => "Customer not found.",
        "persistence_failure" => "Could not save customers. Your change was not applied.",
        _ => "An unexpected error occurred.",
    }
}

fn message_pt(code: &str) -> &'static str {
    match code {
        "invalid_phone" => "O telefone deve ter exatamente 10 dígitos.",
        "invalid_email" => "Informe um e-mail válido.",
        "technician_required" => "Atribua um técnico.",
        "required_fields" => "Um ou mais campos obrigatórios estão vazios.",
        "customer_not_found" => "Cliente não encontrado.",
        "persistence_failure" => "Não foi possível salvar os clientes. A alteração não foi aplicada.",
        _ => "Ocorreu um erro inesperado.",
    }
}

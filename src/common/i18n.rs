// src/common/i18n.rs

use std::{collections::HashMap, sync::Arc};

const DEFAULT_LANG: &str = "en";

// Catálogo em inglês (também é o fallback)
const EN: &[(&str, &str)] = &[
    ("validation_failed", "One or more fields are invalid."),
    ("not_found", "{entity} not found."),
    ("invalid_transition", "{entity} cannot move from '{from}' to '{to}'."),
    ("forbidden", "You need the '{permission}' permission to perform this action."),
    ("invalid_credentials", "Invalid e-mail or password."),
    ("invalid_token", "Authentication token is invalid or missing."),
    ("internal_error", "An unexpected error occurred."),
    ("otp_missing", "This visit has no active OTP. Confirm the visit first."),
    ("otp_mismatch", "The OTP does not match."),
    ("otp_expired", "The OTP has expired. Request a new one."),
    // Entidades
    ("entity.member", "Team member"),
    ("entity.contact", "Contact"),
    ("entity.lead", "Lead"),
    ("entity.seller_lead", "Seller lead"),
    ("entity.building", "Building"),
    ("entity.unit", "Unit"),
    ("entity.listing", "Listing"),
    ("entity.media", "Media item"),
    ("entity.visit", "Visit"),
    ("entity.tour", "Visit tour"),
    ("entity.offer", "Offer"),
    ("entity.note", "Note"),
    ("entity.communication", "Communication"),
    ("entity.task", "Task"),
    ("entity.notification", "Notification"),
    ("entity.credit_rule", "Coin rule"),
    ("entity.automation", "Automation rule"),
    // Conflitos
    ("visit_slot_taken", "The field agent already has a visit in this time slot."),
    ("visit_already_completed", "This visit was already completed."),
    ("listing_not_available", "The listing is not available for visits or offers."),
    ("offer_expired", "The offer has expired."),
    ("contact_phone_taken", "A contact with this phone number already exists."),
    ("member_email_taken", "This e-mail is already in use."),
    ("unit_number_taken", "This unit number already exists in the building."),
    ("credit_already_awarded", "Coins were already awarded for this reference."),
    ("seller_lead_already_converted", "This seller lead was already converted into a listing."),
    ("tour_visit_mismatch", "The visit does not belong to the tour's lead or is already closed."),
    // Códigos de campo
    ("required", "This field is required."),
    ("invalid_phone", "Invalid phone number."),
    ("invalid_email", "Invalid e-mail address."),
    ("invalid_price", "Price must be greater than zero with at most two decimal places."),
    ("budget_range", "Maximum budget must be greater than or equal to the minimum."),
    ("in_past", "The date must be in the future."),
    ("lost_reason_required", "A reason is required when marking as lost."),
    ("reason_required", "A reason is required."),
    ("invalid_latitude", "Latitude must be between -90 and 90."),
    ("invalid_longitude", "Longitude must be between -180 and 180."),
    ("invalid_rating", "Rating must be between 1 and 5."),
    ("invalid_length", "Invalid length."),
    ("invalid_range", "Value out of range."),
    ("invalid_otp_format", "The OTP must contain only digits."),
    ("negative_balance", "The adjustment would leave a negative coin balance."),
    ("media_required", "Add at least one media item before submitting."),
    ("invalid_config", "Invalid automation configuration."),
    ("invalid_amount", "Amount must be greater than zero."),
    ("unit_required", "Provide an existing unit or a new one."),
    ("entity_ref_incomplete", "Provide both entityType and entityId, or neither."),
    ("invalid_url", "Invalid URL."),
    ("concurrent_update", "The record was changed by another request. Reload and try again."),
];

// Catálogo em português
const PT: &[(&str, &str)] = &[
    ("validation_failed", "Um ou mais campos são inválidos."),
    ("not_found", "{entity} não encontrado(a)."),
    ("invalid_transition", "{entity} não pode passar de '{from}' para '{to}'."),
    ("forbidden", "Você precisa da permissão '{permission}' para realizar esta ação."),
    ("invalid_credentials", "E-mail ou senha inválidos."),
    ("invalid_token", "Token de autenticação inválido ou ausente."),
    ("internal_error", "Ocorreu um erro inesperado."),
    ("otp_missing", "Esta visita não possui OTP ativo. Confirme a visita primeiro."),
    ("otp_mismatch", "O OTP não confere."),
    ("otp_expired", "O OTP expirou. Solicite um novo código."),
    ("entity.member", "Membro da equipe"),
    ("entity.contact", "Contato"),
    ("entity.lead", "Lead"),
    ("entity.seller_lead", "Captação"),
    ("entity.building", "Empreendimento"),
    ("entity.unit", "Unidade"),
    ("entity.listing", "Anúncio"),
    ("entity.media", "Mídia"),
    ("entity.visit", "Visita"),
    ("entity.tour", "Roteiro de visitas"),
    ("entity.offer", "Proposta"),
    ("entity.note", "Nota"),
    ("entity.communication", "Comunicação"),
    ("entity.task", "Tarefa"),
    ("entity.notification", "Notificação"),
    ("entity.credit_rule", "Regra de moedas"),
    ("entity.automation", "Regra de automação"),
    ("visit_slot_taken", "O corretor de campo já tem uma visita neste horário."),
    ("visit_already_completed", "Esta visita já foi concluída."),
    ("listing_not_available", "O anúncio não está disponível para visitas ou propostas."),
    ("offer_expired", "A proposta expirou."),
    ("contact_phone_taken", "Já existe um contato com este telefone."),
    ("member_email_taken", "Este e-mail já está em uso."),
    ("unit_number_taken", "Este número de unidade já existe no empreendimento."),
    ("credit_already_awarded", "As moedas desta referência já foram concedidas."),
    ("seller_lead_already_converted", "Esta captação já foi convertida em anúncio."),
    ("tour_visit_mismatch", "A visita não pertence ao lead do roteiro ou já foi encerrada."),
    ("required", "Campo obrigatório."),
    ("invalid_phone", "Telefone inválido."),
    ("invalid_email", "E-mail inválido."),
    ("invalid_price", "O preço deve ser maior que zero e ter no máximo duas casas decimais."),
    ("budget_range", "O orçamento máximo deve ser maior ou igual ao mínimo."),
    ("in_past", "A data deve estar no futuro."),
    ("lost_reason_required", "Informe o motivo da perda."),
    ("reason_required", "Informe um motivo."),
    ("invalid_latitude", "A latitude deve estar entre -90 e 90."),
    ("invalid_longitude", "A longitude deve estar entre -180 e 180."),
    ("invalid_rating", "A nota deve estar entre 1 e 5."),
    ("invalid_length", "Tamanho inválido."),
    ("invalid_range", "Valor fora do intervalo permitido."),
    ("invalid_otp_format", "O OTP deve conter apenas dígitos."),
    ("negative_balance", "O ajuste deixaria o saldo de moedas negativo."),
    ("media_required", "Adicione pelo menos uma mídia antes de enviar."),
    ("invalid_config", "Configuração de automação inválida."),
    ("invalid_amount", "O valor deve ser maior que zero."),
    ("unit_required", "Informe uma unidade existente ou os dados de uma nova."),
    ("entity_ref_incomplete", "Informe entityType e entityId juntos, ou nenhum dos dois."),
    ("invalid_url", "URL inválida."),
    ("concurrent_update", "O registro foi alterado por outra requisição. Recarregue e tente novamente."),
];

/// Catálogos de mensagens por idioma. Barato de clonar (fica no AppState).
#[derive(Clone)]
pub struct I18nStore {
    catalogs: Arc<HashMap<&'static str, HashMap<&'static str, &'static str>>>,
}

impl I18nStore {
    pub fn new() -> Self {
        let mut catalogs = HashMap::new();
        catalogs.insert("en", EN.iter().copied().collect());
        catalogs.insert("pt", PT.iter().copied().collect());
        Self { catalogs: Arc::new(catalogs) }
    }

    /// Traduz uma chave. Cai para o inglês e, por fim, devolve a própria chave.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.lookup(lang, key)
            .or_else(|| self.lookup(DEFAULT_LANG, key))
            .map(str::to_string)
            .unwrap_or_else(|| key.to_string())
    }

    /// Traduz e substitui os marcadores `{nome}` pelos argumentos.
    pub fn format(&self, lang: &str, key: &str, args: &[(&str, &str)]) -> String {
        let mut message = self.translate(lang, key);
        for (name, value) in args {
            message = message.replace(&format!("{{{}}}", name), value);
        }
        message
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&'static str> {
        self.catalogs.get(lang).and_then(|c| c.get(key)).copied()
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_english_then_key() {
        let store = I18nStore::new();
        assert_eq!(store.translate("es", "required"), "This field is required.");
        assert_eq!(store.translate("pt", "required"), "Campo obrigatório.");
        assert_eq!(store.translate("pt", "no.such.key"), "no.such.key");
    }

    #[test]
    fn formats_placeholders() {
        let store = I18nStore::new();
        let msg = store.format(
            "en",
            "invalid_transition",
            &[("entity", "Visit"), ("from", "pending"), ("to", "completed")],
        );
        assert_eq!(msg, "Visit cannot move from 'pending' to 'completed'.");
    }

    #[test]
    fn catalogs_have_the_same_keys() {
        let en: Vec<&str> = EN.iter().map(|(k, _)| *k).collect();
        for (key, _) in PT {
            assert!(en.contains(key), "chave só existe em pt: {}", key);
        }
        assert_eq!(EN.len(), PT.len());
    }
}

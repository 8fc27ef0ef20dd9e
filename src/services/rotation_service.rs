// src/services/rotation_service.rs

use chrono::{DateTime, Datelike, TimeZone, Utc};

use crate::{common::error::AppError, db::DiscountRepository};

// Primeiro instante do mês que contém `as_of`.
pub fn month_start(as_of: DateTime<Utc>) -> Option<DateTime<Utc>> {
    Utc.with_ymd_and_hms(as_of.year(), as_of.month(), 1, 0, 0, 0)
        .single()
}

// Rotação mensal: a venda do mês fechado vira a necessidade do mês corrente
// e o contador de vendas zera. O agendamento (e o lock contra execuções
// sobrepostas) é responsabilidade de quem chama.
#[derive(Clone)]
pub struct RotationService {
    discount_repo: DiscountRepository,
}

impl RotationService {
    pub fn new(discount_repo: DiscountRepository) -> Self {
        Self { discount_repo }
    }

    pub async fn rotate(&self, as_of: DateTime<Utc>) -> Result<u64, AppError> {
        let cutoff = month_start(as_of)
            .ok_or_else(|| anyhow::anyhow!("Data de referência inválida: {}", as_of))?;

        let updated = self.discount_repo.rotate_before(cutoff, as_of).await?;
        tracing::info!(updated, %as_of, "🔄 Rotação mensal de remessas executada");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corte_e_o_primeiro_dia_do_mes() {
        let as_of = Utc.with_ymd_and_hms(2026, 8, 15, 10, 30, 0).unwrap();
        let cutoff = month_start(as_of).unwrap();
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn mes_anterior_fica_antes_do_corte_e_o_corrente_nao() {
        let as_of = Utc.with_ymd_and_hms(2026, 8, 15, 0, 0, 0).unwrap();
        let cutoff = month_start(as_of).unwrap();

        // referência de dois meses atrás: rotaciona
        let stale = Utc.with_ymd_and_hms(2026, 6, 20, 0, 0, 0).unwrap();
        assert!(stale < cutoff);

        // referência já avançada para o mês corrente: segunda chamada é no-op
        assert!(as_of >= cutoff);
    }
}

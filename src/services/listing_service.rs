// src/services/listing_service.rs

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::found,
        error::AppError,
        pagination::{PageParams, Paginated},
        status::StatusFlow,
    },
    db::{
        listing_repo::{ListingChanges, NewListing},
        ListingRepository, PropertyRepository,
    },
    models::{
        activity::EntityKind,
        automation::{AutomationContext, AutomationEvent},
        coins::{AwardRef, RULE_LISTING_APPROVED},
        listing::{
            CreateListingPayload, Listing, ListingDetail, ListingFilter, ListingStatus, MediaItem, MediaPayload,
            NewMedia, UpdateListingPayload,
        },
        notification::{NewNotification, NotificationKind},
        team::TeamMember,
    },
    services::{
        automation_service::AutomationService, coin_service::CoinService,
        notification_service::NotificationService,
    },
};

/// Converte as mídias iniciais: posição padrão pela ordem e no máximo uma capa
/// (a primeira marcada vence).
pub fn plan_initial_media(media: &[MediaPayload]) -> Vec<NewMedia> {
    let cover = media.iter().position(|m| m.is_cover);
    media
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let mut item = m.to_new_media(i as i32);
            item.is_cover = cover == Some(i);
            item
        })
        .collect()
}

/// Cria unidade (opcional), anúncio e mídias na conexão recebida.
/// Quem chama abre e confirma a transação.
pub async fn insert_listing(
    listing_repo: &ListingRepository,
    property_repo: &PropertyRepository,
    conn: &mut PgConnection,
    listing_agent_id: Uuid,
    seller_lead_id: Option<Uuid>,
    payload: &CreateListingPayload,
) -> Result<(Listing, Vec<MediaItem>), AppError> {
    let unit_id = match (payload.unit_id, &payload.new_unit) {
        (Some(unit_id), _) => found(property_repo.find_unit(&mut *conn, unit_id).await?, "unit")?.id,
        (None, Some(new_unit)) => {
            found(property_repo.find_building(&mut *conn, new_unit.building_id).await?, "building")?;
            property_repo.create_unit(&mut *conn, &new_unit.to_new_unit()).await?.id
        }
        (None, None) => return Err(AppError::field("unitId", "unit_required")),
    };

    let listing = listing_repo
        .create(
            &mut *conn,
            &NewListing {
                unit_id,
                seller_lead_id,
                listing_agent_id,
                title: payload.title.trim().to_string(),
                description: payload.description.clone(),
                price: payload.price,
                price_negotiable: payload.price_negotiable,
            },
        )
        .await?;

    let mut media = Vec::with_capacity(payload.media.len());
    for item in plan_initial_media(&payload.media) {
        media.push(listing_repo.add_media(&mut *conn, listing.id, &item).await?);
    }

    Ok((listing, media))
}

#[derive(Clone)]
pub struct ListingService {
    repo: ListingRepository,
    property_repo: PropertyRepository,
    coin_service: CoinService,
    notification_service: NotificationService,
    automation_service: AutomationService,
    pool: PgPool,
}

impl ListingService {
    pub fn new(
        repo: ListingRepository,
        property_repo: PropertyRepository,
        coin_service: CoinService,
        notification_service: NotificationService,
        automation_service: AutomationService,
        pool: PgPool,
    ) -> Self {
        Self { repo, property_repo, coin_service, notification_service, automation_service, pool }
    }

    // =========================================================================
    //  CRUD
    // =========================================================================

    pub async fn create(&self, creator: &TeamMember, payload: &CreateListingPayload) -> Result<ListingDetail, AppError> {
        let agent_id = payload.listing_agent_id.unwrap_or(creator.id);

        let mut tx = self.pool.begin().await?;
        let (listing, media) =
            insert_listing(&self.repo, &self.property_repo, &mut *tx, agent_id, None, payload).await?;
        let detail = self.assemble_detail(&mut *tx, listing, media).await?;
        tx.commit().await?;

        tracing::info!(listing_id = %detail.listing.id, media = detail.media.len(), "Anúncio criado");
        Ok(detail)
    }

    pub async fn list(&self, filter: &ListingFilter, page: &PageParams) -> Result<Paginated<Listing>, AppError> {
        let (listings, total) = self.repo.list(&self.pool, filter, page).await?;
        Ok(Paginated::new(listings, page, total))
    }

    pub async fn get_detail(&self, id: Uuid) -> Result<ListingDetail, AppError> {
        let mut conn = self.pool.acquire().await?;
        let listing = found(self.repo.find_by_id(&mut *conn, id).await?, "listing")?;
        let media = self.repo.list_media(&mut *conn, id).await?;
        self.assemble_detail(&mut *conn, listing, media).await
    }

    pub async fn update(&self, id: Uuid, payload: &UpdateListingPayload) -> Result<Listing, AppError> {
        let current = found(self.repo.find_by_id(&self.pool, id).await?, "listing")?;
        if current.status.is_terminal() {
            return Err(AppError::Conflict("listing_not_available"));
        }

        let changes = ListingChanges {
            title: payload.title.as_deref().map(|t| t.trim().to_string()),
            description: payload.description.clone(),
            price: payload.price,
            price_negotiable: payload.price_negotiable,
            listing_agent_id: payload.listing_agent_id,
        };
        found(self.repo.update(&self.pool, id, &changes).await?, "listing")
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.soft_delete(&self.pool, id).await? {
            return Err(AppError::NotFound("listing"));
        }
        Ok(())
    }

    // =========================================================================
    //  APROVAÇÃO DO CATÁLOGO
    // =========================================================================

    pub async fn submit_for_approval(&self, id: Uuid) -> Result<Listing, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = found(self.repo.find_for_update(&mut *tx, id).await?, "listing")?;
        let target = ListingStatus::PendingApproval;
        if !current.status.can_transition_to(target) {
            return Err(AppError::transition("listing", current.status, target));
        }

        if self.repo.count_media(&mut *tx, id).await? == 0 {
            return Err(AppError::field("media", "media_required"));
        }

        let listing = self
            .repo
            .set_status(&mut *tx, id, current.status, target)
            .await?
            .ok_or(AppError::Conflict("concurrent_update"))?;

        tx.commit().await?;
        tracing::info!(listing_id = %id, "Anúncio enviado para aprovação");
        Ok(listing)
    }

    pub async fn approve(&self, id: Uuid, admin: &TeamMember) -> Result<Listing, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = found(self.repo.find_for_update(&mut *tx, id).await?, "listing")?;
        if current.status != ListingStatus::PendingApproval {
            return Err(AppError::transition("listing", current.status, ListingStatus::Active));
        }

        let listing = self
            .repo
            .approve(&mut *tx, id, admin.id)
            .await?
            .ok_or(AppError::Conflict("concurrent_update"))?;

        self.notification_service
            .notify(
                &mut *tx,
                NewNotification::new(
                    listing.listing_agent_id,
                    NotificationKind::ListingApproved,
                    "Anúncio aprovado",
                    format!("\"{}\" foi publicado no catálogo", listing.title),
                )
                .about(EntityKind::Listing, listing.id),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(listing_id = %id, admin_id = %admin.id, "✅ Anúncio aprovado");

        self.coin_service
            .award_best_effort(
                Some(listing.listing_agent_id),
                RULE_LISTING_APPROVED,
                AwardRef::new(EntityKind::Listing, listing.id),
            )
            .await;

        self.automation_service
            .fire(
                AutomationEvent::ListingApproved,
                AutomationContext::new(EntityKind::Listing, listing.id, Some(listing.listing_agent_id)),
            )
            .await;

        Ok(listing)
    }

    pub async fn reject(&self, id: Uuid, reason: &str) -> Result<Listing, AppError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::field("reason", "reason_required"));
        }

        let mut tx = self.pool.begin().await?;

        let current = found(self.repo.find_for_update(&mut *tx, id).await?, "listing")?;
        if current.status != ListingStatus::PendingApproval {
            return Err(AppError::transition("listing", current.status, ListingStatus::Draft));
        }

        let listing = self
            .repo
            .reject(&mut *tx, id, reason)
            .await?
            .ok_or(AppError::Conflict("concurrent_update"))?;

        self.notification_service
            .notify(
                &mut *tx,
                NewNotification::new(
                    listing.listing_agent_id,
                    NotificationKind::ListingRejected,
                    "Anúncio devolvido",
                    reason.to_string(),
                )
                .about(EntityKind::Listing, listing.id),
            )
            .await?;

        tx.commit().await?;
        Ok(listing)
    }

    /// Demais transições (pausar, retirar, vender...). Envio e aprovação têm rotas próprias.
    pub async fn change_status(&self, id: Uuid, to: ListingStatus) -> Result<Listing, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = found(self.repo.find_for_update(&mut *tx, id).await?, "listing")?;
        let via_catalogue = current.status == ListingStatus::PendingApproval || to == ListingStatus::PendingApproval;
        if via_catalogue || !current.status.can_transition_to(to) {
            return Err(AppError::transition("listing", current.status, to));
        }

        let listing = self
            .repo
            .set_status(&mut *tx, id, current.status, to)
            .await?
            .ok_or(AppError::Conflict("concurrent_update"))?;

        tx.commit().await?;
        tracing::info!(listing_id = %id, from = current.status.as_str(), to = to.as_str(), "Status do anúncio alterado");
        Ok(listing)
    }

    // =========================================================================
    //  MÍDIAS
    // =========================================================================

    pub async fn add_media(&self, listing_id: Uuid, payload: &MediaPayload) -> Result<MediaItem, AppError> {
        let mut tx = self.pool.begin().await?;

        found(self.repo.find_for_update(&mut *tx, listing_id).await?, "listing")?;

        let position = self.repo.count_media(&mut *tx, listing_id).await? as i32;
        let media = payload.to_new_media(position);
        if media.is_cover {
            self.repo.clear_cover(&mut *tx, listing_id).await?;
        }

        let item = self.repo.add_media(&mut *tx, listing_id, &media).await?;
        tx.commit().await?;
        Ok(item)
    }

    pub async fn list_media(&self, listing_id: Uuid) -> Result<Vec<MediaItem>, AppError> {
        found(self.repo.find_by_id(&self.pool, listing_id).await?, "listing")?;
        self.repo.list_media(&self.pool, listing_id).await
    }

    pub async fn set_cover(&self, listing_id: Uuid, media_id: Uuid) -> Result<MediaItem, AppError> {
        let mut tx = self.pool.begin().await?;

        // Trava o anúncio: duas trocas de capa simultâneas não geram duas capas
        found(self.repo.find_for_update(&mut *tx, listing_id).await?, "listing")?;
        self.repo.clear_cover(&mut *tx, listing_id).await?;
        let item = found(self.repo.set_cover(&mut *tx, listing_id, media_id).await?, "media")?;

        tx.commit().await?;
        Ok(item)
    }

    pub async fn delete_media(&self, listing_id: Uuid, media_id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_media(&self.pool, listing_id, media_id).await? {
            return Err(AppError::NotFound("media"));
        }
        Ok(())
    }

    async fn assemble_detail(
        &self,
        conn: &mut PgConnection,
        listing: Listing,
        media: Vec<MediaItem>,
    ) -> Result<ListingDetail, AppError> {
        let unit = found(self.property_repo.find_unit(&mut *conn, listing.unit_id).await?, "unit")?;
        let building = found(self.property_repo.find_building(&mut *conn, unit.building_id).await?, "building")?;
        Ok(ListingDetail { listing, unit, building, media })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::listing::MediaKind;

    fn photo(url: &str, is_cover: bool) -> MediaPayload {
        MediaPayload {
            kind: MediaKind::Photo,
            url: url.to_string(),
            caption: None,
            position: None,
            is_cover,
        }
    }

    #[test]
    fn only_first_cover_is_kept() {
        let media = vec![
            photo("https://cdn.example.com/1.jpg", false),
            photo("https://cdn.example.com/2.jpg", true),
            photo("https://cdn.example.com/3.jpg", true),
        ];

        let planned = plan_initial_media(&media);
        let covers: Vec<bool> = planned.iter().map(|m| m.is_cover).collect();
        assert_eq!(covers, vec![false, true, false]);
        assert_eq!(planned[2].position, 2);
    }

    #[test]
    fn explicit_position_wins() {
        let mut item = photo("https://cdn.example.com/planta.png", false);
        item.position = Some(9);
        assert_eq!(plan_initial_media(&[item])[0].position, 9);
    }
}

use std::collections::HashSet;

use sqlx::PgPool;
use deskrelay_core::address_book::{
    check_peer_cap, merge_first_seen, validate_name, validate_rule, validate_rustdesk_id, AddressBookContents,
    DEFAULT_TAG_COLOR,
};
use deskrelay_core::error::CoreError;
use deskrelay_core::types::DbId;

use super::view::{load_book, AddressBookView};
use super::StoreError;
use crate::models::address_book::{
    AddressBook, AddressBookTag, CreateAddressBook, CreateAddressBookTag, CreatePeer,
    ImportSummary, Peer, TagSummary, UpdateAddressBook,
};
use crate::models::user::User;
use crate::repositories::{AddressBookRepo, AddressBookTagRepo, DeviceRepo, PeerRepo, UserRepo};

/// Address book operations spanning several tables.
pub struct AddressBookStore;

impl AddressBookStore {
    // -----------------------------------------------------------------------
    // Resolution
    // -----------------------------------------------------------------------

    /// Contents of the principal's own address book, from the personal book
    /// when one exists and from the legacy tables otherwise.
    pub async fn resolve_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<AddressBookContents, sqlx::Error> {
        AddressBookView::select(pool, user_id).await?.load(pool).await
    }

    /// Contents of the principal's address book with the given name.
    pub async fn resolve_by_name(
        pool: &PgPool,
        user_id: DbId,
        name: &str,
    ) -> Result<AddressBookContents, StoreError> {
        let name = validate_name(name)?;
        let ab = AddressBookRepo::find_by_user_and_name(pool, user_id, &name)
            .await?
            .ok_or_else(|| CoreError::NotFoundByName {
                entity: "AddressBook",
                name: name.clone(),
            })?;
        Ok(load_book(pool, ab.id).await?)
    }

    /// Tags and peers merged across every address book. Tag names are
    /// deduplicated by first-seen color in address book order.
    pub async fn resolve_shared(pool: &PgPool) -> Result<AddressBookContents, sqlx::Error> {
        let tags = AddressBookTagRepo::list_all(pool).await?;
        let peers = PeerRepo::list_all_in_books(pool).await?;
        Ok(AddressBookContents::from_tag_pairs(
            tags.into_iter().map(|t| (t.name, Some(t.color))),
            peers.iter().map(Peer::to_ab_peer).collect(),
        ))
    }

    /// Tags across all of the user's address books merged by first-seen color.
    pub async fn tag_summary(pool: &PgPool, user_id: DbId) -> Result<Vec<TagSummary>, sqlx::Error> {
        let tags = AddressBookTagRepo::list_by_user(pool, user_id).await?;
        let (names, colors) = merge_first_seen(tags.into_iter().map(|t| (t.name, Some(t.color))));
        Ok(names
            .into_iter()
            .map(|name| {
                let color = colors.get(&name).copied();
                TagSummary { name, color }
            })
            .collect())
    }

    // -----------------------------------------------------------------------
    // Client writes
    // -----------------------------------------------------------------------

    /// Replace the principal's own address book contents through the same
    /// view that [`Self::resolve_for_user`] reads from.
    pub async fn replace_for_user(
        pool: &PgPool,
        user: &User,
        contents: &AddressBookContents,
    ) -> Result<(), StoreError> {
        let view = AddressBookView::select(pool, user.id).await?;
        view.replace(pool, user, contents).await
    }

    /// Return the user's personal address book, creating it on first use.
    pub async fn ensure_personal(pool: &PgPool, user: &User) -> Result<AddressBook, sqlx::Error> {
        let ab = AddressBookRepo::ensure_personal(pool, user.id, &user.username).await?;
        tracing::debug!(user_id = user.id, ab_id = ab.id, "Personal address book ensured");
        Ok(ab)
    }

    // -----------------------------------------------------------------------
    // Console management
    // -----------------------------------------------------------------------

    pub async fn find(pool: &PgPool, ab_id: DbId) -> Result<AddressBook, StoreError> {
        AddressBookRepo::find_by_id(pool, ab_id)
            .await?
            .ok_or(StoreError::Core(CoreError::NotFound {
                entity: "AddressBook",
                id: ab_id,
            }))
    }

    /// Create an address book for an existing user. The owner name is
    /// copied from the user.
    pub async fn create_address_book(
        pool: &PgPool,
        input: &CreateAddressBook,
    ) -> Result<AddressBook, StoreError> {
        let name = validate_name(&input.name)?;
        validate_rule(input.rule)?;
        if input.max_peer < 0 {
            return Err(CoreError::Validation("max_peer must not be negative".into()).into());
        }
        let owner = UserRepo::find_by_id(pool, input.user_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "User",
                id: input.user_id,
            })?;

        let ab = AddressBookRepo::create(
            pool,
            owner.id,
            &name,
            &owner.username,
            &input.note,
            input.rule,
            input.max_peer,
            input.shared,
        )
        .await?;
        tracing::info!(ab_id = ab.id, user_id = owner.id, "Address book created");
        Ok(ab)
    }

    pub async fn update_address_book(
        pool: &PgPool,
        ab_id: DbId,
        input: &UpdateAddressBook,
    ) -> Result<AddressBook, StoreError> {
        if let Some(name) = &input.name {
            validate_name(name)?;
        }
        if let Some(rule) = input.rule {
            validate_rule(rule)?;
        }
        if input.max_peer.is_some_and(|m| m < 0) {
            return Err(CoreError::Validation("max_peer must not be negative".into()).into());
        }
        AddressBookRepo::update(pool, ab_id, input)
            .await?
            .ok_or(StoreError::Core(CoreError::NotFound {
                entity: "AddressBook",
                id: ab_id,
            }))
    }

    /// Delete an address book with its peers and tags in one transaction.
    pub async fn delete_address_book(pool: &PgPool, ab_id: DbId) -> Result<(), StoreError> {
        let mut tx = pool.begin().await?;
        let peers = PeerRepo::delete_by_ab_in_tx(&mut tx, ab_id).await?;
        AddressBookTagRepo::delete_by_ab_in_tx(&mut tx, ab_id).await?;
        if !AddressBookRepo::delete_in_tx(&mut tx, ab_id).await? {
            // Dropping the transaction rolls back the peer and tag deletes.
            return Err(CoreError::NotFound {
                entity: "AddressBook",
                id: ab_id,
            }
            .into());
        }
        tx.commit().await?;
        tracing::info!(ab_id, peers, "Address book deleted");
        Ok(())
    }

    /// Copy every online device into the address book as a peer.
    ///
    /// Devices already present (same rustdesk id) are skipped. Once the book
    /// reaches a positive `max_peer`, the remaining devices are skipped too.
    /// The import is best effort: a failed insert is logged and counted as
    /// skipped, and rows inserted before it stay in place.
    pub async fn import_devices(pool: &PgPool, ab_id: DbId) -> Result<ImportSummary, StoreError> {
        let ab = Self::find(pool, ab_id).await?;
        let devices = DeviceRepo::list_online(pool).await?;
        let mut room = if ab.max_peer > 0 {
            let existing = PeerRepo::count_by_ab(pool, ab.id).await?;
            Some((i64::from(ab.max_peer) - existing).max(0))
        } else {
            None
        };

        let mut summary = ImportSummary {
            total: devices.len() as i64,
            ..Default::default()
        };

        for device in &devices {
            match PeerRepo::exists_in_ab(pool, ab.id, &device.rustdesk_id).await {
                Ok(true) => {
                    summary.skipped += 1;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(ab_id, rustdesk_id = %device.rustdesk_id, error = %e, "Import lookup failed");
                    summary.skipped += 1;
                    continue;
                }
            }
            if room == Some(0) {
                tracing::debug!(ab_id, rustdesk_id = %device.rustdesk_id, "Import skipped: address book full");
                summary.skipped += 1;
                continue;
            }
            match PeerRepo::create_from_device(pool, ab.user_id, ab.id, device).await {
                Ok(_) => {
                    summary.imported += 1;
                    if let Some(left) = room.as_mut() {
                        *left -= 1;
                    }
                }
                Err(e) => {
                    tracing::warn!(ab_id, rustdesk_id = %device.rustdesk_id, error = %e, "Import insert failed");
                    summary.skipped += 1;
                }
            }
        }

        tracing::info!(
            ab_id,
            imported = summary.imported,
            skipped = summary.skipped,
            total = summary.total,
            "Devices imported into address book"
        );
        Ok(summary)
    }

    /// Add a peer to an address book.
    ///
    /// Rejected when the book already holds its positive `max_peer`. Tag
    /// names the book does not know yet are created with the default color
    /// in the same transaction, before the peer row is inserted.
    pub async fn add_peer(pool: &PgPool, ab_id: DbId, input: &CreatePeer) -> Result<Peer, StoreError> {
        let ab = Self::find(pool, ab_id).await?;
        let rustdesk_id = validate_rustdesk_id(&input.rustdesk_id)?;
        if PeerRepo::exists_in_ab(pool, ab.id, &rustdesk_id).await? {
            return Err(CoreError::Validation(format!(
                "Peer {rustdesk_id} already exists in this address book"
            ))
            .into());
        }
        let existing = PeerRepo::count_by_ab(pool, ab.id).await?;
        check_peer_cap(ab.max_peer, existing as usize + 1, "address book peer limit")?;

        let mut seen = HashSet::new();
        let tags: Vec<String> = input
            .tags
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty() && seen.insert(t.clone()))
            .collect();
        let input = CreatePeer {
            tags,
            ..input.clone()
        };

        let mut tx = pool.begin().await?;
        let mut created_tags = 0;
        for tag in &input.tags {
            if AddressBookTagRepo::ensure_in_tx(&mut tx, ab.id, tag, DEFAULT_TAG_COLOR).await? {
                created_tags += 1;
            }
        }
        let peer = PeerRepo::create_in_tx(&mut tx, ab.user_id, ab.id, &rustdesk_id, &input).await?;
        tx.commit().await?;

        tracing::info!(ab_id, peer_id = peer.id, created_tags, "Peer added to address book");
        Ok(peer)
    }

    /// Remove a peer, which must belong to the address book.
    pub async fn delete_peer(pool: &PgPool, ab_id: DbId, peer_id: DbId) -> Result<(), StoreError> {
        Self::find(pool, ab_id).await?;
        if !PeerRepo::delete_in_ab(pool, ab_id, peer_id).await? {
            return Err(CoreError::NotFound {
                entity: "Peer",
                id: peer_id,
            }
            .into());
        }
        Ok(())
    }

    /// Create a tag in an address book. A missing color gets the default.
    pub async fn create_tag(
        pool: &PgPool,
        ab_id: DbId,
        input: &CreateAddressBookTag,
    ) -> Result<AddressBookTag, StoreError> {
        Self::find(pool, ab_id).await?;
        let name = input.name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("Tag name is required".into()).into());
        }
        let color = input.color.unwrap_or(DEFAULT_TAG_COLOR);
        Ok(AddressBookTagRepo::create(pool, ab_id, name, color).await?)
    }

    /// Remove a tag from an address book. Peers keep referencing the name.
    pub async fn delete_tag(pool: &PgPool, ab_id: DbId, tag_id: DbId) -> Result<(), StoreError> {
        Self::find(pool, ab_id).await?;
        if !AddressBookTagRepo::delete_in_ab(pool, ab_id, tag_id).await? {
            return Err(CoreError::NotFound {
                entity: "AddressBookTag",
                id: tag_id,
            }
            .into());
        }
        Ok(())
    }
}

//! Storage model selection for a principal's own address book.

use sqlx::PgPool;
use deskrelay_core::address_book::{
    check_license_cap, check_peer_cap, decode_legacy_color, encode_legacy_color, AbPeer,
    AddressBookContents, DEFAULT_TAG_COLOR,
};
use deskrelay_core::types::DbId;

use super::StoreError;
use crate::models::address_book::AddressBook;
use crate::models::user::User;
use crate::repositories::{AddressBookRepo, AddressBookTagRepo, LegacyTagRepo, PeerRepo};

/// Which storage model backs a principal's address book.
///
/// Chosen once per request by [`AddressBookView::select`]: a principal with
/// a personal address book uses it, everyone else uses the legacy per-user
/// tags and peers. Reads and writes then go through the same variant.
#[derive(Debug, Clone)]
pub enum AddressBookView {
    /// Legacy per-user tags (decimal colors) and peers with no address book.
    Legacy { user_id: DbId },
    /// The principal's personal address book.
    Book(AddressBook),
}

impl AddressBookView {
    pub async fn select(pool: &PgPool, user_id: DbId) -> Result<Self, sqlx::Error> {
        Ok(match AddressBookRepo::find_personal(pool, user_id).await? {
            Some(ab) => AddressBookView::Book(ab),
            None => AddressBookView::Legacy { user_id },
        })
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, AddressBookView::Legacy { .. })
    }

    /// Read tags, tag colors and peers. Pure read.
    pub async fn load(&self, pool: &PgPool) -> Result<AddressBookContents, sqlx::Error> {
        match self {
            AddressBookView::Legacy { user_id } => {
                let tags = LegacyTagRepo::list_by_user(pool, *user_id).await?;
                let peers = PeerRepo::list_legacy_by_user(pool, *user_id).await?;
                Ok(AddressBookContents::from_tag_pairs(
                    tags.into_iter()
                        .map(|t| {
                            let color = decode_legacy_color(&t.color);
                            (t.tag, color)
                        }),
                    peers.iter().map(|p| p.to_ab_peer()).collect(),
                ))
            }
            AddressBookView::Book(ab) => load_book(pool, ab.id).await,
        }
    }

    /// Replace the contents wholesale.
    ///
    /// Caps are checked before anything is written: the user's licensed
    /// device count, and for a personal book its `max_peer`. The delete and
    /// the inserts then run in one transaction, so readers see either the
    /// old or the new contents and a failure leaves the old contents intact.
    /// Duplicate tag names collapse to their first occurrence.
    pub async fn replace(
        &self,
        pool: &PgPool,
        user: &User,
        contents: &AddressBookContents,
    ) -> Result<(), StoreError> {
        check_license_cap(user.licensed_devices, contents.peers.len())?;
        let tag_names = contents.unique_tags();

        match self {
            AddressBookView::Legacy { user_id } => {
                let tags: Vec<(String, String)> = tag_names
                    .into_iter()
                    .map(|name| {
                        let color = encode_legacy_color(contents.color_of(&name));
                        (name, color)
                    })
                    .collect();

                let mut tx = pool.begin().await?;
                LegacyTagRepo::delete_by_user_in_tx(&mut tx, *user_id).await?;
                PeerRepo::delete_legacy_by_user_in_tx(&mut tx, *user_id).await?;
                LegacyTagRepo::insert_many_in_tx(&mut tx, *user_id, &tags).await?;
                PeerRepo::insert_many_in_tx(&mut tx, *user_id, None, &contents.peers).await?;
                tx.commit().await?;
            }
            AddressBookView::Book(ab) => {
                check_peer_cap(ab.max_peer, contents.peers.len(), "address book peer limit")?;
                let tags: Vec<(String, i64)> = tag_names
                    .into_iter()
                    .map(|name| {
                        let color = contents.color_of(&name).unwrap_or(DEFAULT_TAG_COLOR);
                        (name, color)
                    })
                    .collect();
                let peers = unique_peers(&contents.peers);

                let mut tx = pool.begin().await?;
                AddressBookTagRepo::delete_by_ab_in_tx(&mut tx, ab.id).await?;
                PeerRepo::delete_by_ab_in_tx(&mut tx, ab.id).await?;
                AddressBookTagRepo::insert_many_in_tx(&mut tx, ab.id, &tags).await?;
                PeerRepo::insert_many_in_tx(&mut tx, ab.user_id, Some(ab.id), &peers).await?;
                tx.commit().await?;
            }
        }

        tracing::info!(
            user_id = user.id,
            legacy = self.is_legacy(),
            peers = contents.peers.len(),
            "Address book replaced"
        );
        Ok(())
    }
}

/// Tags (packed colors) and peers of one address book.
pub(super) async fn load_book(pool: &PgPool, ab_id: DbId) -> Result<AddressBookContents, sqlx::Error> {
    let tags = AddressBookTagRepo::list_by_ab(pool, ab_id).await?;
    let peers = PeerRepo::list_by_ab(pool, ab_id).await?;
    Ok(AddressBookContents::from_tag_pairs(
        tags.into_iter().map(|t| (t.name, Some(t.color))),
        peers.iter().map(|p| p.to_ab_peer()).collect(),
    ))
}

/// Peers with duplicate rustdesk ids collapsed to their first occurrence.
fn unique_peers(peers: &[AbPeer]) -> Vec<AbPeer> {
    let mut seen = std::collections::HashSet::new();
    peers
        .iter()
        .filter(|p| seen.insert(p.id.as_str()))
        .cloned()
        .collect()
}

use uuid::Uuid;

use crate::{entity::session, model::Identity, prelude::*};

/// Identity sessions created by the identity bridge.
pub struct Session<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Session<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Persist `identity` under a fresh session id.
  pub async fn create(&self, identity: &Identity) -> Result<String> {
    let session_id = Uuid::new_v4().to_string();
    let now = Utc::now().naive_utc();

    session::ActiveModel {
      session_id: Set(session_id.clone()),
      discord_id: Set(identity.id.clone()),
      name: Set(identity.name.clone()),
      avatar_url: Set(identity.avatar_url.clone()),
      created_at: Set(now),
    }
    .insert(self.db)
    .await?;

    Ok(session_id)
  }

  pub async fn identity(&self, session_id: &str) -> Result<Option<Identity>> {
    let row = session::Entity::find_by_id(session_id).one(self.db).await?;
    Ok(row.map(|row| Identity {
      name: row.name,
      id: row.discord_id,
      avatar_url: row.avatar_url,
    }))
  }

  pub async fn remove(&self, session_id: &str) -> Result<()> {
    session::Entity::delete_by_id(session_id).exec(self.db).await?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::memory_db;

  #[tokio::test]
  async fn test_session_round_trip() {
    let db = memory_db().await;
    let sv = Session::new(&db);
    let identity = Identity::new("Foo", "42", None);

    let id = sv.create(&identity).await.unwrap();
    assert_eq!(sv.identity(&id).await.unwrap(), Some(identity));

    sv.remove(&id).await.unwrap();
    assert_eq!(sv.identity(&id).await.unwrap(), None);
  }
}

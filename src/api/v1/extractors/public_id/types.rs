/**
 * Responsibility
 *  - リソースごとの「意味付きID型」を宣言する
 *  - 新しいリソースを追加したらここに Tag と alias を足す
 */
use super::core::PublicId;

// movies
pub enum MovieTag {}
pub type PublicMovieId = PublicId<MovieTag>;

// actors
pub enum ActorTag {}
pub type PublicActorId = PublicId<ActorTag>;

mod member_index;

pub use member_index::{IndexKey, MemberIndex, Position};

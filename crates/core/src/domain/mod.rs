pub mod character;
pub mod equipment;
pub mod item;
pub mod loadout;
pub mod profile;
pub mod progression;

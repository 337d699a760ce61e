//! Curated nickname vocabularies, one pool per (locale, gender).
//!
//! Pools are process-wide read-only data. Entries are unique within a pool
//! so a uniform draw over indices is a uniform draw over nicknames, and the
//! male and female pools of a locale share no entry.

use crate::locale::Locale;
use crate::types::Gender;

/// Nickname pool for the given locale and gender. Never empty.
pub fn pool(locale: Locale, gender: Gender) -> &'static [&'static str] {
    match (locale, gender) {
        (Locale::English, Gender::Male) => &MALE_EN,
        (Locale::English, Gender::Female) => &FEMALE_EN,
        (Locale::Turkish, Gender::Male) => &MALE_TR,
        (Locale::Turkish, Gender::Female) => &FEMALE_TR,
    }
}

pub static MALE_EN: [&str; 87] = [
    "Turbo", "Shadow", "Hurricane", "Lightning", "Eagle", "Drifter", "Captain", "Pirate", "Noble",
    "Panther", "Predator", "Commander", "Grey Wolf", "Volcano", "Hunter", "Wanderer", "Baron",
    "Werewolf", "Man of Steel", "Watermelon Guy", "Meatball Maker", "Lemon Man", "Toastmaster",
    "Sir Mop", "Uncle Robot", "Ninja", "Good Vibes", "Potato King", "Ice Cream Ninja", "Pasta Lord",
    "Gum Chewer", "Crazy Chicken", "Pizza Devotee", "Owner of the Place", "Pickle Man", "Corn King",
    "Kebab Expert", "Master of Shadows", "Golden Fist", "Pixel Monster", "Ghost", "Mad Engineer",
    "NoScope Dad", "Headshot Boss", "Hackerman", "Poison Blade", "Last Samurai", "Space Warrior",
    "Teaholic", "Flatbread Boss", "Cabbie Ray", "Sandwich Guy", "Wrap Ninja", "Gyro Slicer",
    "Anchovy Lord", "Grocer Sam", "Trumpet King", "Bagel Uncle", "Sausage Master",
    "Pickle Juice Hugh", "Tea Guy Murray", "Grill Master Al", "Meatball King", "Gyro Boss", "Xeno",
    "Reaper", "Zed", "Rogue", "Hex", "Bolt", "Zero", "Crash", "Blade", "Specter", "Caramel Man",
    "Mini Barbarian", "Gentle Giant", "King Arthur", "Maniac Mike", "Turbo Sam", "Watermelon Matt",
    "Meatball Ollie", "Crazy Alex", "Toasty Eddie", "Robot Dennis", "Pixel Harry", "Hurricane Max",
];

pub static FEMALE_EN: [&str; 89] = [
    "Hurricane Girl", "Lightning Lady", "Shadow Queen", "Thunderbolt", "Noble Princess",
    "Captain Girl", "Eagle Eye", "Storm", "Brave Heart", "Pirate Girl", "Mystic Force", "Luna",
    "Nova", "Blaze", "Watermelon Lady", "Meatball Madam", "Lemon Sis", "Toast Girl", "Princess",
    "Mop Queen", "Mayonnaise Hunter", "Auntie Robot", "Ninja Girl", "Potato Queen",
    "Ice Cream Princess", "Pasta Lady", "Gum Sis", "Crazy Chicken Girl", "Pizza Queen",
    "Sweet Trouble Lady", "Queen of Shadows", "Silent Strike", "Golden Claw", "Alien Girl",
    "Code Hunter", "Pixel Warrior", "Artificial Intelligence", "Ghost Girl", "Mind Reader",
    "Mad Engineer Lady", "Space Princess", "Somersault Master", "Magic Girl", "Mystery Hunter",
    "Shadow Dancer", "Teaholic Sis", "Sandwich Lady", "Wrap Ninja Girl", "Gyro Sis",
    "Anchovy Queen", "Auntie Grocer", "Trumpet Lady", "Sister Heart", "Bagel Lady",
    "Auntie 3000", "Pickle Juice Lady", "Dessert Girl", "Baked Potato Queen", "Echo", "Frost",
    "ShadowX", "Stella", "Astra", "Zia", "Vortex", "Zenya", "Flare", "Fluffy", "Sweetie",
    "Honey Foam", "Sugar Drop", "Sweet Trouble", "Chubby Cheeks", "Bouncy", "Cookie Monster",
    "Daisy Girl", "Caramel Girl", "Strawberry Dream", "Cute Warrior", "Queen Anna",
    "Alien Ellie", "Pixel Betty", "Watermelon Mary", "Ninja Diana", "Crazy Zoe", "Turbo Selena",
    "Robot Irene", "Pixel Hannah", "Hurricane Mel",
];

pub static MALE_TR: [&str; 87] = [
    "Turbo", "Yıldırım", "Gölge", "Kasırga", "Kartal", "Serseri", "Kaptan", "Korsan", "Asil",
    "Panter", "Yırtıcı", "Komutan", "Bozkurt", "Volkan", "Avcı", "Yolcu", "Baron", "Kurt Adam",
    "Çelik Adam", "Karpuzcu", "Köfteci", "Limoncu", "Tostçu", "Paspas Bey", "Robot Dayı", "Ninja",
    "Kafası Güzel", "Patates Kralı", "Dondurma Ninja", "Makarna Lordu", "Sakızcı", "Çılgın Tavuk",
    "Lahmacun Sevdalısı", "Mekanın Sahibi", "Turşucu", "Mısır Kralı", "Döner Uzmanı",
    "Gölgelerin Efendisi", "Altın Yumruk", "Pixel Canavarı", "Hayalet", "Deli Mühendis",
    "NoScope Baba", "Headshot Reis", "Hackerman", "Zehirli Bıçak", "Son Samuray", "Uzay Savaşçısı",
    "Çaykolik", "Lahmacun Reis", "Taksici Remzi", "Ekmek Arası", "Çiğköfte Ninja", "Tavuk Dönerci",
    "Hamsi Lordu", "Bakkal Samet", "Zurna Kralı", "Simitçi Dayı", "Sucuk Ustası",
    "Şalgamcı Hüseyin", "Çaycı Murat", "Kebapçı Ali", "Köfte Kralı", "Dönerci Reis", "Xeno",
    "Reaper", "Zed", "Rogue", "Hex", "Bolt", "Zero", "Crash", "Blade", "Specter", "Karamel Adam",
    "Mini Barbar", "Şirin Dev", "Kral Ahmet", "Manyak Murat", "Turbo Selim", "Karpuzcu Mehmet",
    "Köfteci Osman", "Çılgın Ali", "Tostçu Enes", "Robot Deniz", "Pixel Hasan", "Kasırga Mustafa",
];

pub static FEMALE_TR: [&str; 89] = [
    "Kasırga Kız", "Yıldırım Kadın", "Gölge Kraliçe", "Şimşek", "Asil Prenses", "Kaptan Kız",
    "Kartal Göz", "Fırtına", "Cesur Yürek", "Korsan Kız", "Gizemli Güç", "Luna", "Nova",
    "Blaze", "Karpuzcu Hatun", "Köfteci Kadın", "Limoncu Abla", "Tostçu Kız", "Prenses",
    "Paspas Kraliçe", "Mayonez Avcısı", "Robot Teyze", "Ninja Kız", "Patates Kraliçesi",
    "Dondurma Prensesi", "Makarna Kadın", "Sakızcı Abla", "Çılgın Tavuk Kız",
    "Lahmacun Kraliçesi", "Tatlı Bela Kadın", "Gölgelerin Kraliçesi", "Sessiz Vuruş",
    "Altın Pençe", "Uzaylı Kız", "Kod Avcısı", "Pixel Savaşçısı", "Yapay Zeka", "Hayalet Kız",
    "Zihin Okuyucu", "Deli Mühendis Kadın", "Uzay Prensesi", "Takla Ustası", "Sihirli Kız",
    "Gizemli Avcı", "Gölge Dansçısı", "Çaykolik Abla", "Ekmek Arası Kadın",
    "Çiğköfte Ninja Kız", "Tavuk Dönerci Abla", "Hamsi Kraliçesi", "Bakkal Teyze",
    "Zurna Kadın", "Gönül Abla", "Simitçi Kadın", "Teyze 3000", "Şalgamcı Hatun", "Tatlıcı Kız",
    "Kumpirci Kraliçe", "Echo", "Frost", "ShadowX", "Stella", "Astra", "Zia", "Vortex", "Zenya",
    "Flare", "Pofuduk", "Minnoş", "Bal Köpüğü", "Şekerpare", "Tatlı Bela", "Ponçik", "Zıp Zıp",
    "Kurabiye Canavarı", "Papatya Kız", "Karamel Kız", "Çilekli Rüya", "Şirin Savaşçı",
    "Kraliçe Ayşe", "Uzaylı Elif", "Piksel Buse", "Karpuzcu Merve", "Ninja Derya",
    "Çılgın Zeynep", "Turbo Selin", "Robot İrem", "Pixel Hande", "Kasırga Melis",
];

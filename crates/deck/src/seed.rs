//! Deck bundled with the application; the first stack and the target of reset.

use shared::domain::{Card, CardId};

fn card(
    id: &str,
    name: &str,
    price: f64,
    description: &str,
    image: &str,
    abv: &str,
    rating: f64,
) -> Card {
    Card {
        id: CardId::new(id),
        name: name.to_string(),
        description: description.to_string(),
        image: image.to_string(),
        price,
        abv: abv.to_string(),
        rating,
    }
}

pub fn seed_cards() -> Vec<Card> {
    vec![
        card(
            "b1",
            "Budweiser",
            9.00,
            "A classic American lager with a crisp, clean taste and smooth finish.",
            "https://as2.ftcdn.net/v2/jpg/03/98/78/43/1000_F_398784300_Zf85OVP4Ok3Gif6UMm1hhDCjg9sEBySa.jpg",
            "5.0%",
            4.0,
        ),
        card(
            "c1",
            "Corona Extra",
            11.00,
            "A light, refreshing pale lager perfect with a slice of lime.",
            "https://as2.ftcdn.net/v2/jpg/08/12/28/95/1000_F_812289523_u1HweF1pvWjU0BvRLN3eJboHh4LCmnke.webp",
            "4.6%",
            4.3,
        ),
        card(
            "h1",
            "Heineken",
            12.00,
            "A premium Dutch lager with balanced bitterness and smooth finish.",
            "https://as2.ftcdn.net/v2/jpg/03/98/78/43/1000_F_398784300_Zf85OVP4Ok3Gif6UMm1hhDCjg9sEBySa.jpg",
            "5.0%",
            4.5,
        ),
        card(
            "h2",
            "Hoegaarden",
            11.00,
            "Belgian white ale with hints of orange peel and coriander.",
            "https://as2.ftcdn.net/v2/jpg/05/17/31/77/1000_F_517317731_FqHg8A6QSSWquoQiXvgT1bFZOjHCitBQ.jpg",
            "4.9%",
            4.6,
        ),
        card(
            "m1",
            "Modelo Especial",
            10.00,
            "A rich, full-flavored pilsner-style lager from Mexico.",
            "https://as1.ftcdn.net/v2/jpg/05/12/85/16/1000_F_512851698_AdyiIVFEH0bsM4qwuJglEr3op4BYFtqO.jpg",
            "4.5%",
            4.2,
        ),
        card(
            "c2",
            "Carlsberg",
            10.00,
            "A well-balanced Danish pilsner with crisp and refreshing taste.",
            "https://as2.ftcdn.net/v2/jpg/04/38/06/35/1000_F_438063582_DtSvQEXtDA1diD3Oiqvp5CV8SBfPjG0n.jpg",
            "5.0%",
            4.1,
        ),
        card(
            "n1",
            "Newcastle Brown Ale",
            11.00,
            "Smooth, easy-drinking English brown ale with a nutty flavor.",
            "https://as2.ftcdn.net/v2/jpg/03/35/34/37/1000_F_335343767_7RxCi7iZLuHSZ1Nt8vx90gCp0eO3qWAo.jpg",
            "4.7%",
            4.3,
        ),
        card(
            "k1",
            "Kingfisher Premium Lager",
            12.49,
            "A crisp, clean, and refreshing lager brewed with the finest Saaz hops.",
            "https://as2.ftcdn.net/v2/jpg/03/85/47/85/1000_F_385478514_iyLq5hJ3Ggnqz1lOBIthxMZdCQsKCW0l.jpg",
            "4.8%",
            3.0,
        ),
    ]
}

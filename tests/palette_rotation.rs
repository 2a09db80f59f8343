use quickchart::palette::{Palette, default_colors};
use quickchart::{ChartMaker, Rgba};
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn rotation_wraps_after_palette_size() {
    let mut maker = ChartMaker::new();
    let n = maker.palette().len();
    let first = maker.next_color();
    for _ in 1..n {
        maker.next_color();
    }
    assert_eq!(maker.next_color(), first);
}

#[test]
fn custom_palette_is_used_in_order() {
    let colors = vec![Rgba::rgb(1, 2, 3), Rgba::rgb(4, 5, 6)];
    let mut p = Palette::new(colors.clone());
    assert_eq!(p.next_color(), colors[0]);
    assert_eq!(p.next_color(), colors[1]);
    assert_eq!(p.next_color(), colors[0]);
    p.reset();
    assert_eq!(p.index(), 0);

    let mut maker = ChartMaker::new().with_palette(Palette::new(colors.clone()));
    assert_eq!(maker.next_color(), colors[0]);
    assert_eq!(maker.next_color(), colors[1]);
}

#[test]
fn seeded_shuffle_is_reproducible() {
    let a = Palette::shuffled_with(&mut StdRng::seed_from_u64(7));
    let b = Palette::shuffled_with(&mut StdRng::seed_from_u64(7));
    assert_eq!(a, b);
    assert_eq!(a.len(), default_colors().len());
}

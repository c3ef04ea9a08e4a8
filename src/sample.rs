/// Source shown when no file is given on the command line.
pub const SAMPLE: &str = r#"// Normal mode: h j k l move, w/b jump words, i inserts, o/O open lines,
// d deletes a line, x a char, s formats and r runs. Esc leaves Insert.

interface Point {
    x: number;
    y: number;
}

function distance(a: Point, b: Point): number {
    const dx = a.x - b.x;
    const dy = a.y - b.y;
    return Math.sqrt(dx * dx + dy * dy);
}

const origin: Point = { x: 0, y: 0 };
const points = [origin, { x: 3, y: 4 }, { x: -1, y: 2 }];

for (const p of points) {
    console.log(`distance to (${p.x}, ${p.y}) = ${distance(origin, p)}`);
}
"#;

/// Daily devotional endpoint
///
/// Serves a static devotional rotated by day of year. Content ships
/// with the binary; there is no editorial backend.
///
/// # Endpoints
///
/// - `GET /v1/devotional/today` - Devotional for the current day

use axum::Json;
use chrono::{Datelike, Utc};
use serde::Serialize;

/// A devotional entry
#[derive(Debug, Clone, Serialize)]
pub struct Devotional {
    /// Scripture reference (e.g., "João 15:1-8")
    pub reference: &'static str,

    /// Passage text
    pub passage: &'static str,

    /// Reflection on the passage
    pub reflection: &'static str,

    /// Question to ponder
    pub question: &'static str,
}

const DEVOTIONALS: &[Devotional] = &[
    Devotional {
        reference: "João 15:1-8",
        passage: "Eu sou a videira verdadeira, e meu Pai é o agricultor. Todo ramo \
            que, estando em mim, não dá fruto, ele corta; e todo que dá fruto ele \
            poda, para que dê mais fruto ainda. Permaneçam em mim, e eu permanecerei \
            em vocês. Nenhum ramo pode dar fruto por si mesmo, se não permanecer na \
            videira. Eu sou a videira; vocês são os ramos. Se alguém permanecer em \
            mim e eu nele, esse dá muito fruto; pois sem mim vocês não podem fazer \
            coisa alguma.",
        reflection: "Jesus se apresenta como a videira verdadeira, e nós somos os \
            ramos. Assim como um ramo precisa estar ligado à videira para receber \
            nutrição e vida, nós precisamos manter nossa comunhão com Jesus através \
            da oração, leitura da Palavra e obediência a Seus ensinamentos.",
        question: "Como posso permanecer mais conectado(a) a Jesus hoje? Que frutos \
            Ele quer produzir através da minha vida?",
    },
    Devotional {
        reference: "Salmos 1:1-3",
        passage: "Como é feliz aquele que não segue o conselho dos ímpios. Antes, \
            sua satisfação está na lei do Senhor, e nessa lei medita dia e noite. \
            É como árvore plantada à beira de águas correntes: dá fruto no tempo \
            certo e suas folhas não murcham.",
        reflection: "A estabilidade espiritual nasce da meditação constante na \
            Palavra. A árvore não produz fruto por esforço próprio, mas por estar \
            plantada no lugar certo.",
        question: "Onde estou plantado(a)? O que tem alimentado minha vida espiritual \
            nesta semana?",
    },
    Devotional {
        reference: "Gálatas 5:22-23",
        passage: "Mas o fruto do Espírito é amor, alegria, paz, paciência, \
            amabilidade, bondade, fidelidade, mansidão e domínio próprio. Contra \
            essas coisas não há lei.",
        reflection: "O fruto do Espírito é singular: um só fruto com muitos sabores. \
            Não escolhemos cultivar apenas os aspectos que nos são fáceis; o Espírito \
            forma o caráter de Cristo inteiro em nós.",
        question: "Qual aspecto do fruto do Espírito mais precisa crescer em mim \
            neste momento?",
    },
    Devotional {
        reference: "Mateus 28:18-20",
        passage: "Foi-me dada toda a autoridade nos céus e na terra. Portanto, vão \
            e façam discípulos de todas as nações, batizando-os em nome do Pai e do \
            Filho e do Espírito Santo, ensinando-os a obedecer a tudo o que eu lhes \
            ordenei. E eu estarei sempre com vocês, até o fim dos tempos.",
        reflection: "Fazer discípulos não é tarefa de especialistas, mas o chamado \
            de todo seguidor de Jesus. E a promessa que sustenta a missão é a Sua \
            presença constante.",
        question: "Quem Deus tem colocado no meu caminho para que eu acompanhe e \
            discipule?",
    },
    Devotional {
        reference: "2 Timóteo 2:2",
        passage: "E as palavras que me ouviu dizer na presença de muitas testemunhas, \
            confie-as a homens fiéis que sejam também capazes de ensinar a outros.",
        reflection: "Paulo descreve quatro gerações espirituais em um único \
            versículo: ele, Timóteo, homens fiéis, e outros. O discipulado saudável \
            sempre pensa além da próxima geração.",
        question: "O que tenho recebido que preciso transmitir a alguém?",
    },
];

/// Returns the devotional for the current day of the year
pub async fn today() -> Json<&'static Devotional> {
    let day = Utc::now().ordinal0() as usize;
    Json(&DEVOTIONALS[day % DEVOTIONALS.len()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_covers_all_entries() {
        for day in 0..366usize {
            let entry = &DEVOTIONALS[day % DEVOTIONALS.len()];
            assert!(!entry.reference.is_empty());
        }
    }

    #[test]
    fn test_entries_are_complete() {
        for entry in DEVOTIONALS {
            assert!(!entry.passage.is_empty());
            assert!(!entry.reflection.is_empty());
            assert!(!entry.question.is_empty());
        }
    }
}

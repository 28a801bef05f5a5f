// src/common/i18n.rs

use std::collections::HashMap;

use anyhow::Context;

/// Idioma usado quando o cliente não pede nenhum (ou pede um que não temos).
pub const IDIOMA_PADRAO: &str = "pt";

// Os arquivos de mensagens vão embutidos no binário.
const LOCALES: &[(&str, &str)] = &[
    ("pt", include_str!("../../locales/pt.json")),
    ("en", include_str!("../../locales/en.json")),
];

/// Catálogo de mensagens traduzidas: idioma -> (chave -> mensagem).
#[derive(Debug, Clone)]
pub struct I18nStore {
    mensagens: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    pub fn carregar() -> anyhow::Result<Self> {
        let mut mensagens = HashMap::new();
        for (idioma, conteudo) in LOCALES {
            let tabela: HashMap<String, String> = serde_json::from_str(conteudo)
                .with_context(|| format!("Arquivo de idioma '{}' inválido", idioma))?;
            mensagens.insert(idioma.to_string(), tabela);
        }
        Ok(Self { mensagens })
    }

    /// Resolve a mensagem: idioma pedido -> idioma padrão -> a própria chave.
    pub fn traduzir(&self, idioma: &str, chave: &str) -> String {
        [idioma, IDIOMA_PADRAO]
            .iter()
            .find_map(|lang| self.mensagens.get(*lang).and_then(|t| t.get(chave)))
            .cloned()
            .unwrap_or_else(|| chave.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traduz_no_idioma_pedido() {
        let store = I18nStore::carregar().unwrap();
        assert_eq!(
            store.traduzir("en", "erro.credenciais_invalidas"),
            "Incorrect e-mail or password."
        );
    }

    #[test]
    fn idioma_desconhecido_cai_no_portugues() {
        let store = I18nStore::carregar().unwrap();
        assert_eq!(
            store.traduzir("fr", "erro.nao_encontrado"),
            "Registro não encontrado."
        );
    }

    #[test]
    fn chave_desconhecida_volta_como_esta() {
        let store = I18nStore::carregar().unwrap();
        assert_eq!(store.traduzir("pt", "erro.inexistente"), "erro.inexistente");
    }

    #[test]
    fn todos_os_idiomas_tem_as_mesmas_chaves() {
        let store = I18nStore::carregar().unwrap();
        let pt = &store.mensagens["pt"];
        let en = &store.mensagens["en"];
        for chave in pt.keys() {
            assert!(en.contains_key(chave), "chave '{}' sem tradução em inglês", chave);
        }
        assert_eq!(pt.len(), en.len());
    }
}
